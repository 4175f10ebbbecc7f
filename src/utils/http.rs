// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::MonitorConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client-level timeout bounds every adapter call; a timed-out poll is
/// reported as a fetch failure and retried on the page's next tick.
pub fn create_async_client(config: &MonitorConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
