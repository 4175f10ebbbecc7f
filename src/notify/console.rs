//! Console renderer for update events.

use crate::models::UpdateEvent;
use crate::notify::Notifier;

const DEFAULT_TEMPLATE: &str = "[{timestamp}] Product: {page}\nStatus: {body}";

/// Prints each new update to stdout.
pub struct ConsoleNotifier {
    template: String,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    /// Use a custom display template (see `UpdateEvent::format`).
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, events: &[UpdateEvent]) {
        for event in events {
            println!("{}", event.format(&self.template));
        }
    }
}
