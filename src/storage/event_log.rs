//! Append-only JSONL log of emitted update events.
//!
//! Once the file grows past the configured byte cap it is rewritten keeping
//! only the last 24 hours of events, falling back to the last
//! [`KEEP_LAST_WHEN_EMPTY`] lines when that window is empty.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::UpdateEvent;

/// Lines kept by a trim when nothing falls inside the 24h window.
const KEEP_LAST_WHEN_EMPTY: usize = 100;

/// JSONL event log rooted at a single file path.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    max_file_bytes: u64,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, max_file_bytes: u64) -> Self {
        Self {
            path: path.into(),
            max_file_bytes,
        }
    }

    /// Append events to the log, trimming afterwards if the file has grown
    /// past the size cap.
    pub async fn append(&self, events: &[UpdateEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.ensure_dir().await?;

        let mut lines = String::new();
        for event in events {
            lines.push_str(&serde_json::to_string(event)?);
            lines.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;

        if tokio::fs::metadata(&self.path).await?.len() > self.max_file_bytes {
            self.trim().await?;
        }
        Ok(())
    }

    /// Read the last `limit` events, newest first. Unparseable lines are
    /// skipped.
    pub async fn read_last(&self, limit: usize) -> Result<Vec<UpdateEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let events: Vec<UpdateEvent> = content
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let skip = events.len().saturating_sub(limit);
        Ok(events.into_iter().skip(skip).rev().collect())
    }

    /// Rewrite the file keeping only recent events.
    async fn trim(&self) -> Result<()> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let cutoff = Utc::now() - Duration::hours(24);

        let mut kept: Vec<&str> = content
            .lines()
            .filter(|line| {
                serde_json::from_str::<UpdateEvent>(line)
                    .map(|event| event.created_at >= cutoff)
                    .unwrap_or(false)
            })
            .collect();

        if kept.is_empty() {
            let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
            let skip = lines.len().saturating_sub(KEEP_LAST_WHEN_EMPTY);
            kept = lines.into_iter().skip(skip).collect();
        }

        let mut output = kept.join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        self.write_atomic(output.as_bytes()).await
    }

    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_atomic(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(name)
    }
}
