//! Service layer for the monitor application.
//!
//! This module contains the business logic for:
//! - Scheduled polling (`PollScheduler`)
//! - Webhook intake (`WebhookIntake`)

mod poller;
mod webhook;

pub use poller::{CycleOutcome, PollContext, PollScheduler, poll_cycle};
pub use webhook::{WebhookIntake, build_router, serve};
