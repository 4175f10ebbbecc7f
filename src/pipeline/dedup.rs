//! Per-page registry of already-reported incident updates.
//!
//! The single source of truth for "is this new?". Entries live for the
//! process lifetime; incident volume per page is tiny (occasional,
//! human-paced events), so there is no eviction.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Dedup identity of one update within a page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpdateKey {
    pub incident_id: String,
    pub update_id: String,
}

impl UpdateKey {
    pub fn new(incident_id: impl Into<String>, update_id: impl Into<String>) -> Self {
        Self {
            incident_id: incident_id.into(),
            update_id: update_id.into(),
        }
    }
}

/// The seen set for one page, behind its own lock so that pages never
/// contend with each other.
pub type PageSet = Arc<Mutex<HashSet<UpdateKey>>>;

/// Tracks which updates have already been reported, per page.
///
/// The outer map lock is held only long enough to look up (or create) a
/// page's set; the check-and-insert sequence runs under that page's lock
/// alone. Poll and webhook paths share one instance per process.
#[derive(Debug, Default)]
pub struct DedupStore {
    pages: Mutex<HashMap<String, PageSet>>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seen set for a page, created on first use.
    pub fn page(&self, page_id: &str) -> PageSet {
        let mut pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        match pages.get(page_id) {
            Some(set) => Arc::clone(set),
            None => {
                let set = PageSet::default();
                pages.insert(page_id.to_string(), Arc::clone(&set));
                set
            }
        }
    }

    /// Whether the update has already been reported for this page.
    pub fn contains(&self, page_id: &str, key: &UpdateKey) -> bool {
        let set = self.page(page_id);
        let seen = set.lock().unwrap_or_else(PoisonError::into_inner);
        seen.contains(key)
    }

    /// Record an update as reported. Returns `true` if it was not seen before.
    pub fn insert(&self, page_id: &str, key: UpdateKey) -> bool {
        let set = self.page(page_id);
        let mut seen = set.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(key)
    }

    /// Number of updates recorded for a page.
    pub fn seen_count(&self, page_id: &str) -> usize {
        let set = self.page(page_id);
        let seen = set.lock().unwrap_or_else(PoisonError::into_inner);
        seen.len()
    }
}
