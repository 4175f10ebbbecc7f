//! Polling scheduler: one independent task per configured page.
//!
//! Each page loops `fetch → cache → detect → notify` forever at its own
//! interval. A slow or failing page never delays another; the only shared
//! state is the dedup store (with the webhook path) and the fetch cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::Page;
use crate::notify::Notifier;
use crate::pipeline::{ChangeDetector, FetchCache};
use crate::providers::{self, FetchOutcome, ProviderAdapter};
use crate::storage::EventLog;

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Conditional fetch reported no change; detection was skipped
    Skipped,
    /// Fresh body processed; number of newly reported updates
    Detected(usize),
}

/// Shared pieces every polling task needs.
pub struct PollContext {
    pub client: Client,
    pub detector: Arc<ChangeDetector>,
    pub cache: FetchCache,
    pub notifier: Arc<dyn Notifier>,
    pub event_log: Option<Arc<EventLog>>,
}

/// Runs the polling loops for all configured pages.
pub struct PollScheduler {
    ctx: Arc<PollContext>,
    pages: Vec<Page>,
    default_interval: Duration,
}

impl PollScheduler {
    pub fn new(ctx: Arc<PollContext>, pages: Vec<Page>, default_interval: Duration) -> Self {
        Self {
            ctx,
            pages,
            default_interval,
        }
    }

    /// Spawn one polling loop per page.
    pub fn spawn_all(&self) -> Vec<JoinHandle<()>> {
        self.pages
            .iter()
            .cloned()
            .map(|page| {
                let ctx = Arc::clone(&self.ctx);
                let interval = page.interval(self.default_interval);
                tokio::spawn(poll_loop(ctx, page, interval))
            })
            .collect()
    }

    /// Run a single concurrent pass over every page. Returns the number of
    /// updates reported.
    pub async fn run_once(&self, max_concurrent: usize) -> usize {
        let mut total = 0;
        let mut cycles = stream::iter(self.pages.iter())
            .map(|page| {
                let ctx = Arc::clone(&self.ctx);
                async move {
                    let adapter = providers::adapter_for(page.provider);
                    (page, poll_cycle(&ctx, page, adapter).await)
                }
            })
            .buffer_unordered(max_concurrent.max(1));

        while let Some((page, result)) = cycles.next().await {
            match result {
                Ok(CycleOutcome::Detected(count)) => total += count,
                Ok(CycleOutcome::Skipped) => {
                    log::debug!("{}: not modified", page.id);
                }
                Err(error) => log::warn!("{}", error),
            }
        }
        total
    }
}

/// Poll one page forever.
///
/// The interval is measured start-to-start: an overlong cycle starts the
/// next one immediately, never concurrently — this loop is the only task
/// fetching its page.
async fn poll_loop(ctx: Arc<PollContext>, page: Page, interval: Duration) {
    let adapter = providers::adapter_for(page.provider);
    loop {
        let started = Instant::now();
        match poll_cycle(&ctx, &page, adapter).await {
            Ok(CycleOutcome::Detected(count)) if count > 0 => {
                log::info!("{}: {} new update(s)", page.id, count);
            }
            Ok(CycleOutcome::Detected(_)) => log::debug!("{}: no new updates", page.id),
            Ok(CycleOutcome::Skipped) => log::debug!("{}: not modified", page.id),
            // Transient: keep cadence and retry with the same validator on
            // the next tick
            Err(error) => log::warn!("{}", error),
        }

        let elapsed = started.elapsed();
        if elapsed < interval {
            tokio::time::sleep(interval - elapsed).await;
        }
    }
}

/// One `fetch → cache → detect → notify` pass for a page.
///
/// On fetch failure the stored validator is left untouched, so the next
/// cycle retries with the last known-good one.
pub async fn poll_cycle(
    ctx: &PollContext,
    page: &Page,
    adapter: &dyn ProviderAdapter,
) -> Result<CycleOutcome> {
    let validator = ctx.cache.validator(&page.id);
    let outcome = adapter
        .fetch(&ctx.client, page, validator.as_deref())
        .await
        .map_err(|error| AppError::fetch(&page.id, error))?;

    match outcome {
        FetchOutcome::NotModified => Ok(CycleOutcome::Skipped),
        FetchOutcome::Fresh {
            incidents,
            validator,
        } => {
            if let Some(validator) = validator {
                ctx.cache.store(&page.id, validator);
            }

            let mut count = 0;
            for incident in &incidents {
                let events = ctx.detector.detect(page, incident);
                if events.is_empty() {
                    continue;
                }
                count += events.len();
                ctx.notifier.notify(&events);
                if let Some(event_log) = &ctx.event_log {
                    if let Err(error) = event_log.append(&events).await {
                        log::warn!("Event log write failed: {}", error);
                    }
                }
            }
            Ok(CycleOutcome::Detected(count))
        }
    }
}
