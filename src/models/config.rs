//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and polling behavior settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Webhook listener settings
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Event log settings
    #[serde(default)]
    pub events: EventLogConfig,

    /// Monitored status pages
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.user_agent.trim().is_empty() {
            return Err(AppError::validation("monitor.user_agent is empty"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(AppError::validation("monitor.timeout_secs must be > 0"));
        }
        if self.monitor.default_interval_secs == 0 {
            return Err(AppError::validation(
                "monitor.default_interval_secs must be > 0",
            ));
        }
        if self.monitor.max_concurrent == 0 {
            return Err(AppError::validation("monitor.max_concurrent must be > 0"));
        }
        if self.pages.is_empty() {
            return Err(AppError::validation("No pages defined"));
        }

        let mut ids = HashSet::new();
        for page in &self.pages {
            if page.id.trim().is_empty() {
                return Err(AppError::validation("Page with empty id"));
            }
            if !ids.insert(page.id.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate page id: {}",
                    page.id
                )));
            }
            url::Url::parse(&page.url).map_err(|e| {
                AppError::validation(format!("Page {} has invalid url: {}", page.id, e))
            })?;
            if page.interval_secs == Some(0) {
                return Err(AppError::validation(format!(
                    "Page {} has interval_secs = 0",
                    page.id
                )));
            }
        }

        if self.webhook.enabled {
            self.webhook
                .bind_addr
                .parse::<std::net::SocketAddr>()
                .map_err(|e| {
                    AppError::validation(format!("webhook.bind_addr is invalid: {}", e))
                })?;
        }
        if self.events.enabled && self.events.max_file_bytes == 0 {
            return Err(AppError::validation("events.max_file_bytes must be > 0"));
        }

        Ok(())
    }
}

/// HTTP client and polling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Poll interval in seconds for pages without one of their own
    #[serde(default = "defaults::interval")]
    pub default_interval_secs: u64,

    /// Maximum concurrent requests in a single poll pass
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl MonitorConfig {
    /// Default poll interval as a `Duration`.
    pub fn default_interval(&self) -> Duration {
        Duration::from_secs(self.default_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            default_interval_secs: defaults::interval(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Webhook listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Whether to accept inbound webhook pushes
    #[serde(default)]
    pub enabled: bool,

    /// Socket address for the webhook listener
    #[serde(default = "defaults::bind_addr")]
    pub bind_addr: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_addr: defaults::bind_addr(),
        }
    }
}

/// Event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Whether to append emitted events to a JSONL file
    #[serde(default = "defaults::events_enabled")]
    pub enabled: bool,

    /// Path of the JSONL file
    #[serde(default = "defaults::events_path")]
    pub path: String,

    /// Size in bytes above which the file is trimmed to recent events
    #[serde(default = "defaults::events_max_bytes")]
    pub max_file_bytes: u64,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::events_enabled(),
            path: defaults::events_path(),
            max_file_bytes: defaults::events_max_bytes(),
        }
    }
}

/// Supported status page providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Atlassian Statuspage (summary.json + incident webhooks)
    Atlassian,
}

/// One monitored status page. Immutable after configuration load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// Stable identifier, also the webhook route segment
    pub id: String,

    /// Display name used in notifications
    #[serde(default)]
    pub name: String,

    /// Provider kind selecting the adapter
    pub provider: ProviderKind,

    /// Base URL of the status page
    pub url: String,

    /// Poll interval in seconds; falls back to `monitor.default_interval_secs`
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

impl Page {
    /// Poll interval for this page, given the configured default.
    pub fn interval(&self, default: Duration) -> Duration {
        self.interval_secs.map_or(default, Duration::from_secs)
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        format!("statuswatch/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn interval() -> u64 {
        30
    }

    pub fn max_concurrent() -> usize {
        4
    }

    pub fn bind_addr() -> String {
        "127.0.0.1:8000".to_string()
    }

    pub fn events_enabled() -> bool {
        true
    }

    pub fn events_path() -> String {
        "data/events.jsonl".to_string()
    }

    pub fn events_max_bytes() -> u64 {
        100 * 1024
    }
}
