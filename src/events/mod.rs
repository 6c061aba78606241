//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by scopes, task wrappers,
//! deadline guards and non-cancellable sections.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scope` (spawn/cancel/complete), the per-task wrapper
//!   (terminal states), `with_deadline` (expiry), `run_non_cancellable`
//!   (section enter/exit).
//! - **Consumers**: the root scope's subscriber listener, which fans events
//!   out to a [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
