// src/pipeline/monitor.rs

//! Monitor entry points: wire configuration into pollers and webhook intake.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::notify::ConsoleNotifier;
use crate::pipeline::{ChangeDetector, FetchCache};
use crate::services::{self, PollContext, PollScheduler, WebhookIntake};
use crate::storage::EventLog;
use crate::utils::http;

fn build_context(config: &Config) -> Result<Arc<PollContext>> {
    let client = http::create_async_client(&config.monitor)?;
    let event_log = config.events.enabled.then(|| {
        Arc::new(EventLog::new(
            &config.events.path,
            config.events.max_file_bytes,
        ))
    });

    Ok(Arc::new(PollContext {
        client,
        detector: Arc::new(ChangeDetector::new()),
        cache: FetchCache::new(),
        notifier: Arc::new(ConsoleNotifier::new()),
        event_log,
    }))
}

/// Run the pollers (and the webhook listener when enabled) until ctrl-c.
pub async fn run_monitor(config: Config) -> Result<()> {
    let ctx = build_context(&config)?;
    let scheduler = PollScheduler::new(
        Arc::clone(&ctx),
        config.pages.clone(),
        config.monitor.default_interval(),
    );
    let mut handles = scheduler.spawn_all();
    log::info!("Polling {} page(s)", config.pages.len());

    if config.webhook.enabled {
        let intake = Arc::new(WebhookIntake::new(
            config.pages.clone(),
            Arc::clone(&ctx.detector),
            Arc::clone(&ctx.notifier),
            ctx.event_log.clone(),
        ));
        let bind_addr = config.webhook.bind_addr.clone();
        handles.push(tokio::spawn(async move {
            if let Err(error) = services::serve(intake, &bind_addr).await {
                log::error!("Webhook listener failed: {}", error);
            }
        }));
    }

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");

    // Abandoning an in-flight fetch is safe: seen keys are inserted only
    // inside a completed detection pass, so no partial state survives.
    for handle in &handles {
        handle.abort();
    }
    Ok(())
}

/// Run a single concurrent poll pass over every page. Returns the number of
/// updates reported.
pub async fn run_once(config: Config) -> Result<usize> {
    let ctx = build_context(&config)?;
    let scheduler = PollScheduler::new(
        Arc::clone(&ctx),
        config.pages.clone(),
        config.monitor.default_interval(),
    );
    Ok(scheduler.run_once(config.monitor.max_concurrent).await)
}
