//! Error types used by scopes and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`ScopeError`] — errors raised by scope lifecycle operations.
//! - [`TaskError`] — errors raised by (or delivered to) individual task bodies.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! Cancellation is modeled as [`TaskError::Canceled`]: it is a cooperative
//! termination reason, not an application failure — use
//! [`TaskError::is_cancellation`] to tell the two apart at join sites.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by scope operations.
///
/// These represent misuse or overrun of the scope lifecycle itself,
/// not failures of the task bodies running inside it.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScopeError {
    /// Spawn was attempted on a scope that is already cancelled/finalizing.
    #[error("scope is closed; no new tasks may be spawned")]
    Closed,

    /// Bounded shutdown overran its grace period; some children are still live.
    #[error("grace period {grace:?} exceeded; {pending} task(s) still pending")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of children that were not terminal when the grace elapsed.
        pending: usize,
    },
}

impl ScopeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskscope::ScopeError;
    ///
    /// assert_eq!(ScopeError::Closed.as_label(), "scope_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScopeError::Closed => "scope_closed",
            ScopeError::GraceExceeded { .. } => "scope_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScopeError::Closed => "scope closed for spawning".to_string(),
            ScopeError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; pending tasks={pending}")
            }
        }
    }
}

/// # Errors produced by (or delivered to) task bodies.
///
/// Delivered to whoever joins the task. [`TaskError::Canceled`] is the
/// *expected* outcome of an explicit cancel and should not be reported as an
/// unexpected failure; everything else is a genuine error.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Cooperative cancellation was observed at a checkpoint.
    #[error("task cancelled")]
    Canceled,

    /// A strict deadline guard expired before the body produced a value.
    #[error("deadline of {budget:?} exceeded")]
    DeadlineExceeded {
        /// The time budget that was exceeded.
        budget: Duration,
    },

    /// Application-level failure raised inside the task body.
    #[error("task failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The task body panicked; the panic was caught at the task boundary.
    #[error("task panicked: {error}")]
    Panicked {
        /// Rendered panic payload.
        error: String,
    },
}

impl TaskError {
    /// Shorthand for building a [`TaskError::Fail`] from any displayable error.
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskscope::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::DeadlineExceeded { budget: Duration::from_millis(60) };
    /// assert_eq!(err.as_label(), "task_deadline_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Canceled => "task_canceled",
            TaskError::DeadlineExceeded { .. } => "task_deadline_exceeded",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Canceled => "cancelled at checkpoint".to_string(),
            TaskError::DeadlineExceeded { budget } => format!("deadline exceeded: {budget:?}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { error } => format!("panic: {error}"),
        }
    }

    /// True when the error is a cooperative termination rather than a failure.
    ///
    /// # Example
    /// ```
    /// use taskscope::TaskError;
    ///
    /// assert!(TaskError::Canceled.is_cancellation());
    /// assert!(!TaskError::fail("boom").is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}
