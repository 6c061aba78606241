//! # TaskContext: the cancellation checkpoint surface.
//!
//! Every task body receives a [`TaskContext`]. It carries the task's
//! cancellation token and is the only sanctioned way to observe cancellation:
//!
//! - [`checkpoint`](TaskContext::checkpoint) — explicit poll; surfaces a
//!   pending request as `Err(TaskError::Canceled)`
//! - [`sleep`](TaskContext::sleep) / [`yield_now`](TaskContext::yield_now) —
//!   suspension points with an implicit checkpoint
//! - [`is_active`](TaskContext::is_active) — boolean poll for compute loops
//!
//! ## The compute-loop hazard
//! Cancellation is advisory. A body built purely from compute (no suspension
//! points) will **not** observe cancellation unless it polls
//! [`is_active`](TaskContext::is_active) or calls
//! [`checkpoint`](TaskContext::checkpoint) at loop boundaries. Polling is
//! mandatory for any unbounded loop:
//!
//! ```rust
//! # use taskscope::{Scope, TaskError};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! # let scope = Scope::new();
//! let handle = scope.spawn(|ctx| async move {
//!     let mut acc = 0u64;
//!     while ctx.is_active() {
//!         for _ in 0..1024 {
//!             acc = acc.wrapping_add(1);
//!         }
//!         ctx.yield_now().await?;
//!     }
//!     Ok(acc)
//! });
//! # scope.cancel_and_join().await;
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::events::Event;

use super::scope::{Scope, ScopeInner};
use super::state::TaskId;

/// Checkpoint surface handed to every task body.
///
/// Cheap to clone; clones share the same token and owning scope.
#[derive(Clone)]
pub struct TaskContext {
    id: TaskId,
    name: Arc<str>,
    token: CancellationToken,
    scope: Arc<ScopeInner>,
}

impl TaskContext {
    pub(crate) fn new(
        id: TaskId,
        name: Arc<str>,
        token: CancellationToken,
        scope: Arc<ScopeInner>,
    ) -> Self {
        Self {
            id,
            name,
            token,
            scope,
        }
    }

    /// Identity of the task this context belongs to.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name of the task this context belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while no cancellation is pending. The mandatory poll for
    /// pure-compute loops.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// True once cancellation has been requested for this task.
    pub fn is_cancel_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Explicit cancellation checkpoint.
    ///
    /// Returns `Err(TaskError::Canceled)` iff a cancellation request is
    /// pending; the body should propagate it with `?` to unwind toward the
    /// `Cancelled` terminal state.
    pub fn checkpoint(&self) -> Result<(), TaskError> {
        if self.token.is_cancelled() {
            Err(TaskError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Cancellable timed wait; a suspension point with an implicit checkpoint.
    ///
    /// Returns `Err(TaskError::Canceled)` as soon as cancellation is
    /// requested, without waiting out the remainder of `dur`.
    pub async fn sleep(&self, dur: Duration) -> Result<(), TaskError> {
        tokio::select! {
            _ = self.token.cancelled() => Err(TaskError::Canceled),
            _ = time::sleep(dur) => Ok(()),
        }
    }

    /// Yields the worker back to the scheduler, then checkpoints.
    pub async fn yield_now(&self) -> Result<(), TaskError> {
        tokio::task::yield_now().await;
        self.checkpoint()
    }

    /// Suspends until cancellation is requested (never resolves otherwise).
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Opens a nested scope owned by this task (structured nesting).
    ///
    /// The nested scope's token is a child of this task's token, so cancelling
    /// the task (or any ancestor) cancels the nested scope. The owning scope's
    /// `join()` waits for the nested scope's children transitively.
    ///
    /// The live nested handle counts as a live child of the owning scope
    /// until it is dropped; a flow that holds it while joining that scope
    /// deadlocks (see [`Scope::child`]).
    ///
    /// Functions that spawn child work should take a scope or context
    /// parameter explicitly; there is no ambient scope lookup.
    pub fn child_scope(&self) -> Scope {
        Scope::nested(&self.scope, self.token.child_token())
    }

    /// Runs `body` in a non-cancellable section.
    /// See [`run_non_cancellable`](crate::run_non_cancellable).
    pub async fn shield<F, Fut, R>(&self, body: F) -> R
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = R>,
    {
        crate::cancel::run_non_cancellable(self, body).await
    }

    /// Runs `body` under a strict deadline.
    /// See [`with_deadline`](crate::with_deadline); `TimedOut` surfaces as
    /// `Err(TaskError::DeadlineExceeded)`.
    pub async fn timeout<F, Fut, T>(&self, budget: Duration, body: F) -> Result<T, TaskError>
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = Result<T, TaskError>>,
    {
        use crate::deadline::{with_deadline, DeadlineOutcome, DeadlinePolicy};
        match with_deadline(self, budget, DeadlinePolicy::Strict, body).await? {
            DeadlineOutcome::Completed(v) => Ok(v),
            DeadlineOutcome::TimedOut => Err(TaskError::DeadlineExceeded { budget }),
        }
    }

    /// Runs `body` under a best-effort deadline; expiry yields `Ok(None)`.
    /// See [`with_deadline`](crate::with_deadline).
    pub async fn timeout_or_none<F, Fut, T>(
        &self,
        budget: Duration,
        body: F,
    ) -> Result<Option<T>, TaskError>
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = Result<T, TaskError>>,
    {
        use crate::deadline::{with_deadline, DeadlinePolicy};
        Ok(with_deadline(self, budget, DeadlinePolicy::BestEffort, body)
            .await?
            .into_option())
    }

    /// Context variant whose checkpoints observe a child token of this one.
    /// Used by the deadline guard so expiry cancels only the guarded body.
    pub(crate) fn child(&self) -> TaskContext {
        TaskContext {
            id: self.id,
            name: Arc::clone(&self.name),
            token: self.token.child_token(),
            scope: Arc::clone(&self.scope),
        }
    }

    /// Context variant with a detached token that nothing cancels.
    /// Used by non-cancellable sections.
    pub(crate) fn detached(&self) -> TaskContext {
        TaskContext {
            id: self.id,
            name: Arc::clone(&self.name),
            token: CancellationToken::new(),
            scope: Arc::clone(&self.scope),
        }
    }

    /// Clone of this context's token (the deadline guard cancels it on expiry).
    pub(crate) fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Task name as a shared string, for event publishing.
    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Publishes a lifecycle event on the owning scope's bus.
    pub(crate) fn publish(&self, ev: Event) {
        self.scope.bus.publish(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scope;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_checkpoint_reflects_pending_cancel() {
        let scope = Scope::new();
        let handle = scope
            .spawn(|ctx| async move {
                assert!(ctx.checkpoint().is_ok());
                ctx.cancelled().await;
                ctx.checkpoint()
            })
            .unwrap();

        handle.cancel();
        assert_eq!(handle.join().await, Err(TaskError::Canceled));
        scope.join().await;
    }

    #[tokio::test]
    async fn test_compute_loop_stops_only_at_poll_boundary() {
        const K: u64 = 1000;

        let scope = Scope::new();
        let iterations = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&iterations);

        let handle = scope
            .spawn(move |ctx| async move {
                loop {
                    // K iterations of pure compute between polls; cancellation
                    // cannot land inside this block.
                    for _ in 0..K {
                        seen.fetch_add(1, Ordering::Relaxed);
                    }
                    if !ctx.is_active() {
                        return Err(TaskError::Canceled);
                    }
                    ctx.yield_now().await?;
                }
            })
            .unwrap();

        // Let the loop run a few rounds before cancelling.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        handle.cancel();
        let res: Result<(), TaskError> = handle.join().await;
        assert_eq!(res, Err(TaskError::Canceled));

        // Termination only ever happens at a poll boundary, so the counter is
        // an exact multiple of K.
        let total = iterations.load(Ordering::Relaxed);
        assert!(total > 0);
        assert_eq!(total % K, 0);
        scope.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_is_a_suspension_point_checkpoint() {
        let scope = Scope::new();
        let handle = scope
            .spawn(|ctx| async move {
                ctx.sleep(Duration::from_secs(3600)).await?;
                Ok(())
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1)).await;
        let started = tokio::time::Instant::now();
        let res = handle.cancel_and_join().await;
        assert_eq!(res, Err(TaskError::Canceled));
        // Did not wait out the hour.
        assert!(started.elapsed() < Duration::from_secs(1));
        scope.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_scope_is_cancelled_with_its_task() {
        let scope = Scope::new();
        let handle = scope
            .spawn(|ctx| async move {
                let nested = ctx.child_scope();
                let inner = nested
                    .spawn(|ctx| async move { ctx.sleep(Duration::from_secs(3600)).await })
                    .map_err(|e| TaskError::fail(e.as_message()))?;
                let res = inner.join().await;
                nested.join().await;
                res
            })
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1)).await;
        handle.cancel();
        assert_eq!(handle.join().await, Err(TaskError::Canceled));
        scope.join().await;
    }
}
