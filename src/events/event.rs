//! # Lifecycle events emitted by scopes, tasks, and guards.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Task lifecycle**: spawn and terminal states (completed, cancelled, failed)
//! - **Scope lifecycle**: cancellation, completion, grace overrun
//! - **Guard sections**: deadline expiry and non-cancellable section boundaries
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! task/scope names, reasons, and deadline budgets.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskscope::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::DeadlineHit)
//!     .with_task("fetch")
//!     .with_scope("root")
//!     .with_timeout(Duration::from_millis(60));
//!
//! assert_eq!(ev.kind, EventKind::DeadlineHit);
//! assert_eq!(ev.task.as_deref(), Some("fetch"));
//! assert_eq!(ev.timeout_ms, Some(60));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// A task was spawned under a scope.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `scope`: owning scope name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskSpawned,

    /// A task reached `Completed` (body returned `Ok`).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskCompleted,

    /// A task reached `Cancelled` (body observed cancellation at a checkpoint).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskCancelled,

    /// A task reached `Failed` (body returned an error or panicked).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskFailed,

    // === Scope lifecycle events ===
    /// A scope was cancelled; the request is visible to all current children.
    ///
    /// Sets:
    /// - `scope`: scope name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ScopeCancelled,

    /// Every child of a scope (transitively) reached a terminal state.
    ///
    /// Sets:
    /// - `scope`: scope name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ScopeCompleted,

    /// Bounded shutdown overran its grace period with live children.
    ///
    /// Sets:
    /// - `scope`: scope name
    /// - `reason`: pending-children summary
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    GraceExceeded,

    // === Guard sections ===
    /// A deadline guard's budget elapsed; cancellation was raised on the body.
    ///
    /// Sets:
    /// - `task`: guarded task name
    /// - `timeout_ms`: budget (ms)
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    DeadlineHit,

    /// A non-cancellable section was entered.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: `"cancel-pending"` if cancellation was already requested
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShieldEntered,

    /// A non-cancellable section ran its body to completion.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ShieldExited,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Name of the scope, if applicable.
    pub scope: Option<Arc<str>>,
    /// Human-readable reason (errors, pending-cancel markers, etc.).
    pub reason: Option<Arc<str>>,
    /// Deadline budget in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            scope: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a scope name.
    #[inline]
    pub fn with_scope(mut self, scope: impl Into<Arc<str>>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a deadline budget (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// True for terminal task events (`TaskCompleted`/`TaskCancelled`/`TaskFailed`).
    #[inline]
    pub fn is_task_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskCompleted | EventKind::TaskCancelled | EventKind::TaskFailed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TaskSpawned);
        let b = Event::new(EventKind::TaskSpawned);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_attaches_fields() {
        let ev = Event::new(EventKind::TaskFailed)
            .with_task("worker")
            .with_scope("root")
            .with_reason("boom");
        assert_eq!(ev.task.as_deref(), Some("worker"));
        assert_eq!(ev.scope.as_deref(), Some("root"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
        assert!(ev.is_task_terminal());
    }

    #[test]
    fn test_timeout_saturates_to_u32() {
        let ev = Event::new(EventKind::DeadlineHit)
            .with_timeout(Duration::from_millis(u64::from(u32::MAX) + 10));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));
    }
}
