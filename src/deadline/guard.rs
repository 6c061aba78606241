//! # Deadline guard: time-bounded execution of a body.
//!
//! [`with_deadline`] races a body against a timer of length `budget`:
//!
//! ```text
//! body completes first:
//!   body(ctx') ──► Ok(v)  ──► Completed(v), timer discarded
//!              ──► Err(e) ──► Err(e)        (Canceled = enclosing cancel)
//!
//! timer elapses first:
//!   cancel(child token) ──► publish DeadlineHit ──► await body (cooperative)
//!       ├─► body yields a value anyway ──► Completed(v)   (late-value rule)
//!       ├─► body unwinds with Canceled ──► Strict:     Err(DeadlineExceeded)
//!       │                                   BestEffort: Ok(TimedOut)
//!       └─► body fails on the way out  ──► Err(e)
//! ```
//!
//! ## The late-value rule
//! If the body acquires a resource *after* the deadline fired but *before*
//! observing cancellation, the value is still returned as `Completed` — even
//! under [`DeadlinePolicy::Strict`]. A value that was actually produced is
//! never dropped inside the guard; the **caller** is responsible for releasing
//! any resource it receives, on every path. This closes the leak window in the
//! race between "acquire" and "deadline fires".
//!
//! ## Rules
//! - Expiry cancels only the guard's child token; the enclosing task and its
//!   siblings are unaffected.
//! - An enclosing cancellation is never misreported as a timeout: it
//!   propagates as `Err(TaskError::Canceled)`.

use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::scope::TaskContext;

/// What expiry means for the guard's caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlinePolicy {
    /// Expiry surfaces as `Err(TaskError::DeadlineExceeded)` once the body
    /// has actually terminated.
    #[default]
    Strict,
    /// Expiry is suppressed; the caller receives [`DeadlineOutcome::TimedOut`].
    BestEffort,
}

/// Tagged result at the guard boundary: a value, or a witnessed timeout.
///
/// Errors travel separately in the `Result` wrapping this type, giving callers
/// an explicit three-way decision point (`Completed | TimedOut | Err`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineOutcome<T> {
    /// The body produced a value (possibly after the deadline fired — see the
    /// late-value rule in the module docs).
    Completed(T),
    /// The deadline fired and the body unwound without producing a value.
    /// Only observable under [`DeadlinePolicy::BestEffort`].
    TimedOut,
}

impl<T> DeadlineOutcome<T> {
    /// `Completed(v)` → `Some(v)`, `TimedOut` → `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            DeadlineOutcome::Completed(v) => Some(v),
            DeadlineOutcome::TimedOut => None,
        }
    }

    /// True for [`DeadlineOutcome::TimedOut`].
    pub fn is_timed_out(&self) -> bool {
        matches!(self, DeadlineOutcome::TimedOut)
    }
}

/// Runs `body` with a time budget; on expiry, cancels the body's token and
/// waits for it to terminate cooperatively.
///
/// The body receives a context whose token is a **child** of `ctx`'s: the
/// guard's expiry cancels the body only, while an enclosing cancellation
/// reaches the body through the token tree and propagates out unchanged.
///
/// Convenience adapters live on the context:
/// [`TaskContext::timeout`] (Strict, unwrapped value) and
/// [`TaskContext::timeout_or_none`] (BestEffort, `Option`).
pub async fn with_deadline<F, Fut, T>(
    ctx: &TaskContext,
    budget: Duration,
    policy: DeadlinePolicy,
    body: F,
) -> Result<DeadlineOutcome<T>, TaskError>
where
    F: FnOnce(TaskContext) -> Fut,
    Fut: Future<Output = Result<T, TaskError>>,
{
    let guarded = ctx.child();
    let guard_token = guarded.token();

    let fut = body(guarded);
    tokio::pin!(fut);
    let timer = time::sleep(budget);
    tokio::pin!(timer);

    let mut expired = false;
    let res = tokio::select! {
        res = &mut fut => res,
        _ = &mut timer => {
            expired = true;
            guard_token.cancel();
            ctx.publish(
                Event::new(EventKind::DeadlineHit)
                    .with_task(ctx.name_arc())
                    .with_timeout(budget),
            );
            // Cancellation is cooperative; termination is not instantaneous.
            fut.await
        }
    };

    match res {
        Ok(value) => Ok(DeadlineOutcome::Completed(value)),
        Err(TaskError::Canceled) if expired && !ctx.is_cancel_requested() => match policy {
            DeadlinePolicy::Strict => Err(TaskError::DeadlineExceeded { budget }),
            DeadlinePolicy::BestEffort => Ok(DeadlineOutcome::TimedOut),
        },
        Err(e) => Err(e),
    }
}
