//! Integration tests: a scripted adapter driving the real detection pipeline
//! through both the polling and webhook paths.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;

use statuswatch::error::{AppError, Result};
use statuswatch::models::{Incident, Page, ProviderKind, Update, UpdateEvent};
use statuswatch::notify::Notifier;
use statuswatch::pipeline::{ChangeDetector, FetchCache};
use statuswatch::providers::{FetchOutcome, ProviderAdapter};
use statuswatch::services::{CycleOutcome, PollContext, WebhookIntake, poll_cycle};

/// Collects every emitted event.
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<UpdateEvent>>,
}

impl RecordingNotifier {
    fn update_ids(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.update_id.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, events: &[UpdateEvent]) {
        self.events.lock().unwrap().extend_from_slice(events);
    }
}

/// Poll-only adapter driven by a queue of scripted outcomes; records the
/// validator sent with each fetch.
#[derive(Default)]
struct ScriptedAdapter {
    outcomes: Mutex<VecDeque<Result<FetchOutcome>>>,
    validators_seen: Mutex<Vec<Option<String>>>,
}

impl ScriptedAdapter {
    fn push(&self, outcome: Result<FetchOutcome>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    fn validators_seen(&self) -> Vec<Option<String>> {
        self.validators_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    async fn fetch(
        &self,
        _client: &Client,
        _page: &Page,
        validator: Option<&str>,
    ) -> Result<FetchOutcome> {
        self.validators_seen
            .lock()
            .unwrap()
            .push(validator.map(str::to_string));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(FetchOutcome::NotModified))
    }

    fn normalize_push(&self, _body: &[u8]) -> Result<Incident> {
        unreachable!("scripted adapter only serves the polling path")
    }
}

fn page() -> Page {
    Page {
        id: "p1".to_string(),
        name: "Page One".to_string(),
        provider: ProviderKind::Atlassian,
        url: "https://status.example.com".to_string(),
        interval_secs: None,
    }
}

fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 5, 10, minute, 0).unwrap()
}

fn update(id: &str, minute: u32) -> Update {
    Update {
        id: id.to_string(),
        status: "investigating".to_string(),
        body: format!("update {id}"),
        created_at: Some(ts(minute)),
    }
}

fn incident(updates: Vec<Update>) -> Incident {
    Incident {
        id: "inc1".to_string(),
        name: "Test incident".to_string(),
        updates,
    }
}

fn fresh(incidents: Vec<Incident>, validator: Option<&str>) -> FetchOutcome {
    FetchOutcome::Fresh {
        incidents,
        validator: validator.map(str::to_string),
    }
}

fn context(notifier: Arc<RecordingNotifier>) -> Arc<PollContext> {
    Arc::new(PollContext {
        client: Client::new(),
        detector: Arc::new(ChangeDetector::new()),
        cache: FetchCache::new(),
        notifier,
        event_log: None,
    })
}

fn push_body(update_id: &str) -> String {
    format!(
        r#"{{
            "page": {{"id": "ext-page-id"}},
            "incident": {{
                "id": "inc1",
                "name": "Test incident",
                "incident_updates": [
                    {{"id": "{update_id}", "status": "investigating", "body": "update {update_id}", "created_at": "2026-08-05T10:00:00Z"}}
                ]
            }}
        }}"#
    )
}

#[tokio::test]
async fn poll_emits_chronologically_and_exactly_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = context(Arc::clone(&notifier));
    let adapter = ScriptedAdapter::default();

    // Reversed input order on the first fetch
    adapter.push(Ok(fresh(
        vec![incident(vec![update("u2", 2), update("u1", 1)])],
        Some("v1"),
    )));
    adapter.push(Ok(fresh(
        vec![incident(vec![update("u2", 2), update("u1", 1)])],
        Some("v1"),
    )));
    adapter.push(Ok(fresh(
        vec![incident(vec![
            update("u1", 1),
            update("u2", 2),
            update("u3", 3),
        ])],
        Some("v2"),
    )));

    let outcome = poll_cycle(&ctx, &page(), &adapter).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Detected(2));
    assert_eq!(notifier.update_ids(), vec!["u1", "u2"]);

    // Identical body again: nothing new
    let outcome = poll_cycle(&ctx, &page(), &adapter).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Detected(0));

    // One appended update: only it is reported
    let outcome = poll_cycle(&ctx, &page(), &adapter).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Detected(1));
    assert_eq!(notifier.update_ids(), vec!["u1", "u2", "u3"]);
}

#[tokio::test]
async fn not_modified_skips_detection() {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = context(Arc::clone(&notifier));
    let adapter = ScriptedAdapter::default();

    adapter.push(Ok(fresh(Vec::new(), Some("v1"))));
    adapter.push(Ok(FetchOutcome::NotModified));

    assert_eq!(
        poll_cycle(&ctx, &page(), &adapter).await.unwrap(),
        CycleOutcome::Detected(0)
    );
    assert_eq!(
        poll_cycle(&ctx, &page(), &adapter).await.unwrap(),
        CycleOutcome::Skipped
    );

    // The second fetch carried the stored validator; detection never ran
    assert_eq!(
        adapter.validators_seen(),
        vec![None, Some("v1".to_string())]
    );
    assert_eq!(ctx.detector.store().seen_count("p1"), 0);
    assert!(notifier.update_ids().is_empty());
}

#[tokio::test]
async fn fetch_failure_preserves_validator() {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = context(Arc::clone(&notifier));
    let adapter = ScriptedAdapter::default();

    adapter.push(Ok(fresh(Vec::new(), Some("v1"))));
    adapter.push(Err(AppError::fetch("p1", "connection reset")));
    adapter.push(Ok(FetchOutcome::NotModified));

    poll_cycle(&ctx, &page(), &adapter).await.unwrap();

    let err = poll_cycle(&ctx, &page(), &adapter).await.unwrap_err();
    assert!(matches!(err, AppError::Fetch { .. }));
    assert_eq!(ctx.cache.validator("p1").as_deref(), Some("v1"));

    // The cycle after the failure retries with the same validator the
    // failing cycle used
    poll_cycle(&ctx, &page(), &adapter).await.unwrap();
    let validators = adapter.validators_seen();
    assert_eq!(validators[1], validators[2]);
    assert_eq!(validators[2].as_deref(), Some("v1"));
}

#[tokio::test]
async fn webhook_then_poll_duplicate_reported_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = context(Arc::clone(&notifier));
    let intake = WebhookIntake::new(
        [page()],
        Arc::clone(&ctx.detector),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        None,
    );

    // u1 arrives by push first
    let events = intake.handle("p1", push_body("u1").as_bytes()).await.unwrap();
    assert_eq!(events.len(), 1);

    // A later poll returns u1 again plus a genuinely new u2
    let adapter = ScriptedAdapter::default();
    adapter.push(Ok(fresh(
        vec![incident(vec![update("u1", 0), update("u2", 2)])],
        None,
    )));
    let outcome = poll_cycle(&ctx, &page(), &adapter).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Detected(1));

    assert_eq!(notifier.update_ids(), vec!["u1", "u2"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_poll_and_webhook_report_once() {
    let notifier = Arc::new(RecordingNotifier::default());
    let ctx = context(Arc::clone(&notifier));
    let adapter = Arc::new(ScriptedAdapter::default());
    let intake = Arc::new(WebhookIntake::new(
        [page()],
        Arc::clone(&ctx.detector),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        None,
    ));

    for i in 0..50 {
        let update_id = format!("u{i}");
        adapter.push(Ok(fresh(
            vec![incident(vec![Update {
                id: update_id.clone(),
                status: "investigating".to_string(),
                body: format!("update {update_id}"),
                created_at: Some(ts(0)),
            }])],
            None,
        )));

        let poll_ctx = Arc::clone(&ctx);
        let poll_adapter = Arc::clone(&adapter);
        let poll_page = page();
        let poll = tokio::spawn(async move {
            poll_cycle(&poll_ctx, &poll_page, poll_adapter.as_ref()).await
        });

        let hook_intake = Arc::clone(&intake);
        let body = push_body(&update_id);
        let hook = tokio::spawn(async move { hook_intake.handle("p1", body.as_bytes()).await });

        let (poll_result, hook_result) = tokio::join!(poll, hook);
        poll_result.unwrap().unwrap();
        hook_result.unwrap().unwrap();
    }

    // Every update came in simultaneously through both paths; each must be
    // reported exactly once
    let mut counts: HashMap<String, usize> = HashMap::new();
    for id in notifier.update_ids() {
        *counts.entry(id).or_default() += 1;
    }
    assert_eq!(counts.len(), 50);
    assert!(counts.values().all(|&c| c == 1), "duplicate emission: {counts:?}");
}
