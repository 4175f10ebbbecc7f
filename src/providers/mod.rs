// src/providers/mod.rs

//! Provider adapters for status page APIs.
//!
//! Each provider implements `ProviderAdapter`: a conditional fetch for the
//! polling path and a push normalizer for the webhook path. The detection
//! pipeline depends only on this contract, never on wire formats. New
//! providers add a `ProviderKind` variant and an adapter; the detector and
//! scheduler stay untouched.

mod atlassian;

pub use atlassian::AtlassianAdapter;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Incident, Page, ProviderKind};

/// Result of one conditional poll against a provider.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page has not changed since the supplied validator
    NotModified,

    /// A fresh body, with the validator to send on the next poll (if the
    /// provider supplied one)
    Fresh {
        incidents: Vec<Incident>,
        validator: Option<String>,
    },
}

/// Capability set every provider must offer.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Fetch the page's current incidents, conditionally on `validator`.
    async fn fetch(
        &self,
        client: &Client,
        page: &Page,
        validator: Option<&str>,
    ) -> Result<FetchOutcome>;

    /// Normalize a webhook push body into an incident.
    fn normalize_push(&self, body: &[u8]) -> Result<Incident>;
}

/// Adapter for the given provider kind.
pub fn adapter_for(kind: ProviderKind) -> &'static dyn ProviderAdapter {
    match kind {
        ProviderKind::Atlassian => &AtlassianAdapter,
    }
}
