// src/notify/mod.rs

//! Notification output for newly detected updates.

mod console;

pub use console::ConsoleNotifier;

use crate::models::UpdateEvent;

/// Sink for new updates leaving the detection pipeline.
///
/// Receives each batch in the chronological order the detector established;
/// rendering is the sink's concern, deciding what is new is not.
pub trait Notifier: Send + Sync {
    fn notify(&self, events: &[UpdateEvent]);
}
