//! # Deadline enforcement as cancellation-with-a-clock.
//!
//! A deadline guard wraps a body with a time budget. Expiry does not preempt:
//! it raises cancellation on the body's token and then waits for the body to
//! terminate at its own checkpoints, sharing every cooperative limitation of
//! plain cancellation.

mod guard;

pub use guard::{with_deadline, DeadlineOutcome, DeadlinePolicy};
