//! Update event emitted for each newly detected incident update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A new incident update, flattened for notification and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateEvent {
    /// Configured page identifier
    pub page_id: String,

    /// Page display name
    pub page_name: String,

    /// Provider-assigned incident identifier
    pub incident_id: String,

    /// Incident display name
    pub incident_name: String,

    /// Update identifier
    pub update_id: String,

    /// Status label
    pub status: String,

    /// Update body text
    pub body: String,

    /// Update creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UpdateEvent {
    /// Format the event for display using a template.
    ///
    /// Supported placeholders:
    /// - `{page_id}`, `{page}`, `{incident_id}`, `{incident}`
    /// - `{update_id}`, `{status}`, `{body}`, `{timestamp}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{page_id}", &self.page_id)
            .replace("{page}", &self.page_name)
            .replace("{incident_id}", &self.incident_id)
            .replace("{incident}", &self.incident_name)
            .replace("{update_id}", &self.update_id)
            .replace("{status}", &self.status)
            .replace("{body}", &self.body)
            .replace(
                "{timestamp}",
                &self.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
    }
}
