//! # Task identity and lifecycle states.
//!
//! A task moves forward-only through
//! `Created → Running → {Completed | Cancelled | Failed}`.
//!
//! A *pending cancellation request* is deliberately **not** a state here: it
//! is an overlay readable via
//! [`TaskHandle::is_cancel_requested`](crate::TaskHandle::is_cancel_requested)
//! while the task is still `Running`, because the request only takes effect
//! once the body observes it at a checkpoint.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global counter for task identities.
static TASK_SEQ: AtomicU64 = AtomicU64::new(0);

/// Unique identity of a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocates the next identity (globally monotonic).
    pub(crate) fn next() -> Self {
        TaskId(TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Spawned but not yet polled.
    Created,
    /// Body is executing (or suspended at an await point).
    Running,
    /// Body unwound after observing cancellation at a checkpoint.
    Cancelled,
    /// Body returned `Ok`.
    Completed,
    /// Body returned an error or panicked.
    Failed,
}

impl TaskState {
    /// True for `Completed`, `Cancelled`, and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Cancelled | TaskState::Failed
        )
    }

    /// Whether `self → next` is a legal forward transition.
    ///
    /// Terminal states accept no transitions; `Created` only advances to
    /// `Running`; `Running` only advances to a terminal state.
    pub fn can_advance_to(&self, next: TaskState) -> bool {
        match self {
            TaskState::Created => matches!(next, TaskState::Running),
            TaskState::Running => next.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Created => "created",
            TaskState::Running => "running",
            TaskState::Cancelled => "cancelled",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = TaskId::next();
        let b = TaskId::next();
        assert!(b.as_u64() > a.as_u64());
        assert_eq!(format!("{a}"), format!("task-{}", a.as_u64()));
    }

    #[test]
    fn test_transitions_are_forward_only() {
        assert!(TaskState::Created.can_advance_to(TaskState::Running));
        assert!(TaskState::Running.can_advance_to(TaskState::Completed));
        assert!(TaskState::Running.can_advance_to(TaskState::Cancelled));
        assert!(TaskState::Running.can_advance_to(TaskState::Failed));

        assert!(!TaskState::Created.can_advance_to(TaskState::Completed));
        assert!(!TaskState::Running.can_advance_to(TaskState::Created));
        assert!(!TaskState::Completed.can_advance_to(TaskState::Running));
        assert!(!TaskState::Cancelled.can_advance_to(TaskState::Failed));
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!TaskState::Created.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Cancelled.is_terminal());
        assert!(TaskState::Failed.is_terminal());
    }
}
