//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and (behind the `logging` feature) a built-in stdout [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scope / task wrapper / guards ── publish(Event) ──► Bus
//!                                                        │
//!                                      root scope listener (one receiver)
//!                                                        │
//!                                                SubscriberSet::emit(&Event)
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                         [queue S1] [queue S2] [queue SN]
//!                                              ▼         ▼         ▼
//!                                        sub1.on_event  ...  subN.on_event
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use taskscope::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFailed {
//!             // increment failure counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "metrics"
//!     }
//! }
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
