//! Atlassian Statuspage adapter.
//!
//! Polls `/api/v2/summary.json` with `If-Modified-Since` and parses incident
//! webhook pushes into the normalized incident shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Incident, Page, Update};
use crate::providers::{FetchOutcome, ProviderAdapter};

/// Parsed subset of `summary.json`.
#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    incidents: Vec<RawIncident>,
}

#[derive(Debug, Deserialize)]
struct RawIncident {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    incident_updates: Vec<RawUpdate>,
}

#[derive(Debug, Deserialize)]
struct RawUpdate {
    #[serde(default)]
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    created_at: Option<String>,
}

/// Webhook push envelope: `{"page": ..., "incident": ...}`.
#[derive(Debug, Deserialize)]
struct PushEnvelope {
    incident: RawIncident,
}

impl RawIncident {
    fn normalize(self) -> Incident {
        Incident {
            id: self.id,
            name: self.name,
            updates: self
                .incident_updates
                .into_iter()
                .map(|u| Update {
                    id: u.id,
                    status: u.status,
                    body: u.body,
                    created_at: parse_timestamp(u.created_at.as_deref()),
                })
                .collect(),
        }
    }
}

/// Parse a Statuspage timestamp; invalid values become `None` and are
/// filtered out downstream instead of failing the whole incident.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Adapter for Atlassian Statuspage.
pub struct AtlassianAdapter;

impl AtlassianAdapter {
    fn summary_url(page: &Page) -> Result<String> {
        let base = url::Url::parse(&page.url)?;
        Ok(base.join("/api/v2/summary.json")?.to_string())
    }
}

#[async_trait]
impl ProviderAdapter for AtlassianAdapter {
    async fn fetch(
        &self,
        client: &Client,
        page: &Page,
        validator: Option<&str>,
    ) -> Result<FetchOutcome> {
        let url = Self::summary_url(page)?;

        let mut request = client.get(&url);
        if let Some(validator) = validator {
            request = request.header(IF_MODIFIED_SINCE, validator);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        let response = response.error_for_status()?;

        let validator = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let summary: Summary = response.json().await?;
        Ok(FetchOutcome::Fresh {
            incidents: summary
                .incidents
                .into_iter()
                .map(RawIncident::normalize)
                .collect(),
            validator,
        })
    }

    fn normalize_push(&self, body: &[u8]) -> Result<Incident> {
        let envelope: PushEnvelope = serde_json::from_slice(body)?;
        Ok(envelope.incident.normalize())
    }
}
