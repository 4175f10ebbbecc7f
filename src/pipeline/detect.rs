//! Change detection against the dedup store.
//!
//! Takes a normalized incident and returns the subset of its updates that
//! have not been reported before, in chronological order, marking them as
//! seen in the same critical section.

use std::sync::PoisonError;

use crate::error::AppError;
use crate::models::{Incident, Page, UpdateEvent};
use crate::pipeline::dedup::{DedupStore, UpdateKey};

/// Filters incidents down to their unseen updates.
///
/// Holds the shared dedup store; one instance serves both the poll and
/// webhook paths so an update arriving through either is reported once.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    store: DedupStore,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying dedup store.
    pub fn store(&self) -> &DedupStore {
        &self.store
    }

    /// Return the incident's unseen updates in chronological order, marking
    /// each as seen before returning.
    ///
    /// Updates are sorted by creation timestamp ascending, ties broken by
    /// update id, so output order is deterministic regardless of adapter
    /// ordering quirks. Calling twice with identical input yields an empty
    /// result the second time.
    ///
    /// An update without an id or timestamp is logged and skipped; the rest
    /// of the batch is unaffected.
    pub fn detect(&self, page: &Page, incident: &Incident) -> Vec<UpdateEvent> {
        let mut updates: Vec<_> = incident.updates.iter().collect();
        updates.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        // One lock acquisition per page covers the whole read-check-insert
        // batch; a racing call for the same page waits here, calls for other
        // pages do not.
        let set = self.store.page(&page.id);
        let mut seen = set.lock().unwrap_or_else(PoisonError::into_inner);

        let mut new = Vec::new();
        for update in updates {
            let created_at = match update.created_at {
                Some(ts) if !update.id.is_empty() => ts,
                _ => {
                    let error = AppError::malformed_update(
                        &incident.id,
                        "update is missing an id or timestamp",
                    );
                    log::warn!("Skipping update on page {}: {}", page.id, error);
                    continue;
                }
            };

            let key = UpdateKey::new(&incident.id, &update.id);
            if seen.insert(key) {
                new.push(UpdateEvent {
                    page_id: page.id.clone(),
                    page_name: page.display_name().to_string(),
                    incident_id: incident.id.clone(),
                    incident_name: incident.name.clone(),
                    update_id: update.id.clone(),
                    status: update.status.clone(),
                    body: update.body.clone(),
                    created_at,
                });
            }
        }
        new
    }
}
