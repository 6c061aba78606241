//! # taskscope
//!
//! **Taskscope** is a structured-concurrency primitive for async Rust:
//! scoped task ownership, cooperative cancellation, and deadline enforcement
//! over tokio. It is a building block for programs that need "no orphaned
//! background work, no leaked resources" guarantees without a full
//! orchestration framework.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       ┌─────────────┐  ┌─────────────┐  ┌─────────────┐
//!       │  task body  │  │  task body  │  │  task body  │
//!       │ (user code) │  │ (user code) │  │ (user code) │
//!       └──────┬──────┘  └──────┬──────┘  └──────┬──────┘
//!              ▼                ▼                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Scope (ownership / lifetime boundary)                       │
//! │  - CancellationToken tree (top-down cancel propagation)      │
//! │  - liveness counter       (bottom-up completion accounting)  │
//! │  - Bus (broadcast lifecycle events)                          │
//! └──────┬─────────────────┬─────────────────┬───────────┬───────┘
//!        ▼                 ▼                 ▼           │
//!   TaskHandle<T>     nested Scope      TaskContext      │
//!   (join/cancel)    (structured          (checkpoints,  │
//!                     nesting)             sleep, shield,│
//!                                          deadlines)    ▼
//!                                            ┌────────────────────┐
//!                                            │ subscriber listener│
//!                                            │  (root scope)      │
//!                                            └─────────┬──────────┘
//!                                                      ▼
//!                                               SubscriberSet
//!                                            (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Scope::spawn(body) ──► wrapper task
//!
//!   ├─► state = Running
//!   ├─► body(ctx).await
//!   │      │
//!   │      ├─ Ok(v)            ─► Completed  ─► publish TaskCompleted
//!   │      ├─ Err(Canceled)    ─► Cancelled  ─► publish TaskCancelled
//!   │      ├─ Err(other)       ─► Failed     ─► publish TaskFailed
//!   │      └─ panic (caught)   ─► Failed     ─► publish TaskFailed
//!   │
//!   └─► liveness counter -= 1   (exactly once, on every path)
//!
//! Scope::cancel()  ─► token tree cancelled, scope closed for spawning
//! Scope::join()    ─► await liveness == 0  (transitive, re-entrant)
//! ```
//!
//! ## Cancellation model
//! Cancellation is **advisory and cooperative**: requesting it sets a token,
//! and the body observes the request at checkpoints (explicit
//! [`TaskContext::checkpoint`] / [`TaskContext::is_active`] polls, or implicit
//! ones at suspension points like [`TaskContext::sleep`]). Nothing is ever
//! preempted mid-instruction, which also means a compute loop that never polls
//! will never stop — polling is mandatory for unbounded loops.
//!
//! Deadlines are cancellation-with-a-clock: [`with_deadline`] cancels the
//! guarded body's token when the budget elapses and then waits for the body to
//! unwind. [`run_non_cancellable`] is the matching escape hatch for cleanup
//! that must finish even on the cancellation path.
//!
//! ## Features
//! | Area           | Description                                              | Key types / functions                      |
//! |----------------|----------------------------------------------------------|--------------------------------------------|
//! | **Scoping**    | Spawn, join, cancel; structured nesting.                 | [`Scope`], [`TaskHandle`]                  |
//! | **Checkpoints**| Observe cancellation cooperatively.                      | [`TaskContext`]                            |
//! | **Deadlines**  | Time-bounded bodies, strict or best-effort.              | [`with_deadline`], [`DeadlineOutcome`]     |
//! | **Cleanup**    | Cancellation-masked finalization sections.               | [`run_non_cancellable`]                    |
//! | **Resources**  | Exactly-once release accounting.                         | [`ResourcePool`], [`Resource`]             |
//! | **Errors**     | Typed errors for scopes and task bodies.                 | [`ScopeError`], [`TaskError`]              |
//! | **Events**     | Lifecycle events with subscriber fan-out.                | [`Event`], [`Subscribe`], [`SubscriberSet`]|
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskscope::{Scope, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scope = Scope::new();
//!
//!     let worker = scope.spawn_named("worker", |ctx| async move {
//!         let mut ticks = 0u32;
//!         while ctx.is_active() {
//!             ctx.sleep(Duration::from_millis(10)).await?;
//!             ticks += 1;
//!         }
//!         Ok(ticks)
//!     })?;
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     match worker.cancel_and_join().await {
//!         Ok(_) | Err(TaskError::Canceled) => {}
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     scope.join().await;
//!     Ok(())
//! }
//! ```

mod cancel;
mod config;
mod deadline;
mod error;
mod events;
mod resource;
mod scope;
mod subscribers;

// ---- Public re-exports ----

pub use cancel::run_non_cancellable;
pub use config::ScopeConfig;
pub use deadline::{with_deadline, DeadlineOutcome, DeadlinePolicy};
pub use error::{ScopeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use resource::{Resource, ResourcePool};
pub use scope::{Scope, TaskContext, TaskHandle, TaskId, TaskState};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
