//! # Typed handle to a spawned task.
//!
//! A [`TaskHandle`] is returned by [`Scope::spawn`](crate::Scope::spawn) and is
//! the joiner's view of one task: query its state, request cancellation, and
//! consume it to receive the body's result.
//!
//! ## Rules
//! - `join()` consumes the handle; the result is delivered exactly once.
//! - `cancel()` is advisory and idempotent — the body terminates at its next
//!   checkpoint, never mid-instruction.
//! - Dropping the handle does **not** detach or cancel the task; the owning
//!   scope still waits for it (structured-exit rule).

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

use super::state::{TaskId, TaskState};

/// Handle for joining/cancelling a single task owned by a scope.
pub struct TaskHandle<T> {
    id: TaskId,
    name: Arc<str>,
    token: CancellationToken,
    state: watch::Receiver<TaskState>,
    join: JoinHandle<Result<T, TaskError>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(
        id: TaskId,
        name: Arc<str>,
        token: CancellationToken,
        state: watch::Receiver<TaskState>,
        join: JoinHandle<Result<T, TaskError>>,
    ) -> Self {
        Self {
            id,
            name,
            token,
            state,
            join,
        }
    }

    /// Identity of the task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name used in published events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests cooperative cancellation of this task only. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once cancellation has been requested (directly or via the scope),
    /// regardless of whether the body has observed it yet.
    pub fn is_cancel_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// True once the task reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Suspends until the task is terminal and returns the body's result.
    ///
    /// Cancellation arrives as `Err(TaskError::Canceled)`; a panicking body
    /// arrives as `Err(TaskError::Panicked)`. Errors are never swallowed.
    pub async fn join(self) -> Result<T, TaskError> {
        match self.join.await {
            Ok(res) => res,
            Err(err) if err.is_cancelled() => Err(TaskError::Canceled),
            Err(err) => Err(TaskError::Panicked {
                error: err.to_string(),
            }),
        }
    }

    /// Atomic composition of [`cancel`](TaskHandle::cancel) +
    /// [`join`](TaskHandle::join).
    pub async fn cancel_and_join(self) -> Result<T, TaskError> {
        self.cancel();
        self.join().await
    }
}
