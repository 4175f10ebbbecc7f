//! Webhook intake: push notifications fed straight into change detection.
//!
//! Pushes bypass the fetch cache — there is no prior "unchanged" state to
//! compare a push against. Deduplication against the polling path happens
//! entirely in the shared dedup store.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::post;

use crate::error::{AppError, Result};
use crate::models::{Page, UpdateEvent};
use crate::notify::Notifier;
use crate::pipeline::ChangeDetector;
use crate::providers;
use crate::storage::EventLog;

/// Accepts provider pushes and reports any unseen updates.
pub struct WebhookIntake {
    pages: HashMap<String, Page>,
    detector: Arc<ChangeDetector>,
    notifier: Arc<dyn Notifier>,
    event_log: Option<Arc<EventLog>>,
}

impl WebhookIntake {
    pub fn new(
        pages: impl IntoIterator<Item = Page>,
        detector: Arc<ChangeDetector>,
        notifier: Arc<dyn Notifier>,
        event_log: Option<Arc<EventLog>>,
    ) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| (page.id.clone(), page))
                .collect(),
            detector,
            notifier,
            event_log,
        }
    }

    /// Normalize one push body and report its unseen updates.
    ///
    /// An update delivered here and later seen again by polling (or vice
    /// versa) is reported exactly once.
    pub async fn handle(&self, page_id: &str, body: &[u8]) -> Result<Vec<UpdateEvent>> {
        let page = self
            .pages
            .get(page_id)
            .ok_or_else(|| AppError::unknown_page(page_id))?;

        let adapter = providers::adapter_for(page.provider);
        let incident = adapter.normalize_push(body)?;

        let events = self.detector.detect(page, &incident);
        if !events.is_empty() {
            self.notifier.notify(&events);
            if let Some(event_log) = &self.event_log {
                if let Err(error) = event_log.append(&events).await {
                    log::warn!("Event log write failed: {}", error);
                }
            }
        }
        Ok(events)
    }
}

/// Build the webhook router.
pub fn build_router(intake: Arc<WebhookIntake>) -> Router {
    Router::new()
        .route("/webhook/{page_id}", post(webhook_handler))
        .with_state(intake)
}

/// Pushes are acknowledged regardless of outcome; intake failures are
/// logged, never returned to the sender.
async fn webhook_handler(
    State(intake): State<Arc<WebhookIntake>>,
    Path(page_id): Path<String>,
    body: Bytes,
) -> &'static str {
    match intake.handle(&page_id, &body).await {
        Ok(events) if !events.is_empty() => {
            log::info!("Webhook {}: {} new update(s)", page_id, events.len());
        }
        Ok(_) => log::debug!("Webhook {}: no new updates", page_id),
        Err(error) => log::warn!("Webhook {}: {}", page_id, error),
    }
    "OK"
}

/// Bind and serve the webhook listener until the task is cancelled.
pub async fn serve(intake: Arc<WebhookIntake>, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    log::info!("Webhook listener on {}", bind_addr);
    axum::serve(listener, build_router(intake)).await?;
    Ok(())
}
