//! # Counted resources with exactly-once release.
//!
//! [`ResourcePool`] is an injected acquisition counter: tests and hosts create
//! one, pass clones into task bodies, and assert balance at the end — no
//! hidden process-wide state. [`Resource`] is the externally acquired handle;
//! it is released exactly once via the consuming [`Resource::close`].
//!
//! ## Rules
//! - A resource is owned by whichever task acquired it; only that task (or
//!   code it explicitly hands the value to, such as a deadline guard's caller)
//!   may release it.
//! - `close()` consumes the handle, so a double release does not compile.
//! - Dropping a handle **without** closing it leaks the count on purpose:
//!   [`ResourcePool::in_flight`] stays elevated, which is exactly the signal
//!   the leak tests assert on.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

/// Injected acquisition counter shared by a family of [`Resource`]s.
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct ResourcePool {
    acquired: Arc<AtomicI64>,
}

impl ResourcePool {
    /// Creates a pool with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a resource, incrementing the shared counter.
    pub fn acquire(&self) -> Resource {
        self.acquired.fetch_add(1, AtomicOrdering::SeqCst);
        Resource {
            counter: Arc::clone(&self.acquired),
        }
    }

    /// Number of acquired-but-not-closed resources.
    pub fn in_flight(&self) -> i64 {
        self.acquired.load(AtomicOrdering::SeqCst)
    }
}

/// An externally acquired handle requiring exactly-once release.
#[derive(Debug)]
pub struct Resource {
    counter: Arc<AtomicI64>,
}

impl Resource {
    /// Releases the resource, decrementing the pool counter. Consumes the
    /// handle; there is no second release.
    pub fn close(self) {
        self.counter.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}
