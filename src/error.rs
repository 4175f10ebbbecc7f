// src/error.rs

//! Unified error handling for the monitor application.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A poll cycle failed; the page is retried on its next tick
    #[error("Fetch error for {page}: {message}")]
    Fetch { page: String, message: String },

    /// An incident update arrived without an id or timestamp
    #[error("Malformed update in incident {incident}: {message}")]
    MalformedUpdate { incident: String, message: String },

    /// A webhook push referenced a page that is not configured
    #[error("Unknown page: {0}")]
    UnknownPage(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with page context.
    pub fn fetch(page: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            page: page.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-update error with incident context.
    pub fn malformed_update(incident: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedUpdate {
            incident: incident.into(),
            message: message.to_string(),
        }
    }

    /// Create an unknown-page error.
    pub fn unknown_page(page: impl Into<String>) -> Self {
        Self::UnknownPage(page.into())
    }
}
