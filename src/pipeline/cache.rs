//! Last-known fetch validators for conditional polling.
//!
//! Each page stores the opaque validator (a `Last-Modified` value) from its
//! most recent successful fetch. The poller sends it back as a conditional
//! marker so an unchanged page costs one lightweight request and zero
//! detection work. Only the polling path touches this cache; failed fetches
//! leave the stored value alone.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Per-page validators from the most recent successful fetch.
#[derive(Debug, Default)]
pub struct FetchCache {
    validators: Mutex<HashMap<String, String>>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validator to send on the next poll of this page, if any.
    pub fn validator(&self, page_id: &str) -> Option<String> {
        let validators = self
            .validators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        validators.get(page_id).cloned()
    }

    /// Store the validator from a successful fetch.
    pub fn store(&self, page_id: &str, validator: String) {
        let mut validators = self
            .validators
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        validators.insert(page_id.to_string(), validator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_first_fetch() {
        let cache = FetchCache::new();
        assert_eq!(cache.validator("p1"), None);
    }

    #[test]
    fn test_store_and_overwrite() {
        let cache = FetchCache::new();
        cache.store("p1", "Mon, 03 Aug 2026 10:00:00 GMT".to_string());
        assert_eq!(
            cache.validator("p1").as_deref(),
            Some("Mon, 03 Aug 2026 10:00:00 GMT")
        );

        cache.store("p1", "Tue, 04 Aug 2026 10:00:00 GMT".to_string());
        assert_eq!(
            cache.validator("p1").as_deref(),
            Some("Tue, 04 Aug 2026 10:00:00 GMT")
        );
    }

    #[test]
    fn test_pages_do_not_share_validators() {
        let cache = FetchCache::new();
        cache.store("p1", "v1".to_string());
        assert_eq!(cache.validator("p2"), None);
    }
}
