//! Normalized incident data structures.
//!
//! Every provider adapter must produce this shape; the detection pipeline
//! never sees provider-specific wire formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One incident reported by a status page.
///
/// Reconstructed fresh on every fetch or push; only its updates matter for
/// deduplication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Incident {
    /// Provider-assigned incident identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// State transitions, in whatever order the provider supplied them
    pub updates: Vec<Update>,
}

/// One state transition within an incident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Update {
    /// Update identifier, unique within its incident per provider
    pub id: String,

    /// Status label, e.g. "investigating" or "resolved"
    pub status: String,

    /// Free-text body
    pub body: String,

    /// Creation timestamp; `None` when the provider value failed to parse.
    /// Such updates are skipped by detection, never reported.
    pub created_at: Option<DateTime<Utc>>,
}
