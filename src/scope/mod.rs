//! # Scopes, task handles, and the checkpoint surface.
//!
//! This module provides the structured-concurrency core:
//! - [`Scope`] — ownership/lifetime boundary for a set of tasks
//! - [`TaskHandle`] — typed handle for joining/cancelling one task
//! - [`TaskContext`] — the cancellation checkpoint surface handed to bodies
//! - [`TaskId`], [`TaskState`] — identity and forward-only lifecycle states
//!
//! ## Structured-exit rule
//! A scope's `join()` does not return until every task ever spawned under it,
//! transitively through nested scopes, is terminal. This is the invariant that
//! prevents orphaned background work and resource leaks.

mod context;
mod handle;
mod scope;
mod state;

pub use context::TaskContext;
pub use handle::TaskHandle;
pub use scope::Scope;
pub use state::{TaskId, TaskState};
