//! # Non-cancellable sections.
//!
//! [`run_non_cancellable`] executes a body in a sub-context that ignores any
//! pending cancellation for the duration of the call, so that cleanup logic
//! (releasing a [`Resource`](crate::Resource), flushing a buffer) runs to
//! normal completion even though the enclosing task is already
//! cancel-requested.
//!
//! ## Rules
//! - The body gets a **detached** token: its checkpoints and timed waits never
//!   observe the enclosing cancellation.
//! - The enclosing task's cancellation state is untouched: a pending request
//!   is still pending after the section and fires at the **first checkpoint
//!   after** it.
//! - This is a deliberate escape hatch for finalization only, not for general
//!   logic. Do not nest sections or park indefinitely inside one — a scope
//!   cannot complete while a section is still running.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskscope::Scope;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scope = Scope::new();
//! let handle = scope.spawn(|ctx| async move {
//!     let res = ctx.sleep(Duration::from_secs(3600)).await;
//!     if res.is_err() {
//!         // Cancelled mid-wait: cleanup still gets a timed wait of its own.
//!         ctx.shield(|s| async move {
//!             s.sleep(Duration::from_millis(10)).await
//!         })
//!         .await
//!         .expect("shielded wait never observes the outer cancel");
//!     }
//!     res
//! }).unwrap();
//!
//! handle.cancel();
//! scope.join().await;
//! # }
//! ```

use std::future::Future;

use crate::events::{Event, EventKind};
use crate::scope::TaskContext;

/// Executes `body` with cancellation masked; returns the body's value.
///
/// The section always runs to normal completion. Any cancellation pending on
/// `ctx` is re-observed at the first checkpoint after this call returns — the
/// section defers the request, it never consumes it.
pub async fn run_non_cancellable<F, Fut, R>(ctx: &TaskContext, body: F) -> R
where
    F: FnOnce(TaskContext) -> Fut,
    Fut: Future<Output = R>,
{
    let pending = ctx.is_cancel_requested();
    let mut entered = Event::new(EventKind::ShieldEntered).with_task(ctx.name_arc());
    if pending {
        entered = entered.with_reason("cancel-pending");
    }
    ctx.publish(entered);

    let out = body(ctx.detached()).await;

    ctx.publish(Event::new(EventKind::ShieldExited).with_task(ctx.name_arc()));
    out
}
