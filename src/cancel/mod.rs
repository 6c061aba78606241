//! # Cancellation masking for guaranteed cleanup.
//!
//! Cooperative cancellation means a cancelled body still has to release what
//! it acquired. [`run_non_cancellable`] provides the masked region where that
//! cleanup is guaranteed to run to completion.

mod shield;

pub use shield::run_non_cancellable;
