//! # Root scope configuration.
//!
//! Provides [`ScopeConfig`], the settings applied when building a root
//! [`Scope`](crate::Scope) via [`Scope::with_config`](crate::Scope::with_config).
//!
//! Nested scopes inherit the root's bus and grace; only the root takes a config.
//!
//! ## Sentinel values
//! - `bus_capacity` is clamped to a minimum of 1 by the bus.
//! - `grace = 0s` → `shutdown()` gives children no time at all and reports
//!   `GraceExceeded` immediately if any child is still live.

use std::borrow::Cow;
use std::time::Duration;

/// Configuration for a root scope.
///
/// Defines:
/// - **Identity**: scope name used in published events
/// - **Shutdown behavior**: grace period for bounded shutdown
/// - **Event system**: bus capacity for event delivery
#[derive(Clone, Debug)]
pub struct ScopeConfig {
    /// Name of the root scope, attached to every scope-level event.
    pub name: Cow<'static, str>,

    /// Maximum time `shutdown()` waits for children after cancelling them.
    ///
    /// When the grace elapses with live children, `shutdown()` returns
    /// [`ScopeError::GraceExceeded`](crate::ScopeError::GraceExceeded); the
    /// children keep running until they observe cancellation (cancellation is
    /// cooperative — nothing is force-killed).
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by the bus).
    pub bus_capacity: usize,
}

impl ScopeConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ScopeConfig {
    /// Default configuration:
    ///
    /// - `name = "root"`
    /// - `grace = 60s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("root"),
            grace: Duration::from_secs(60),
            bus_capacity: 1024,
        }
    }
}
