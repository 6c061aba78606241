//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [spawned] task=worker scope=root
//! [completed] task=worker
//! [cancelled] task=worker
//! [failed] task=worker err="connection refused"
//! [deadline-hit] task=worker budget=60ms
//! [shield-entered] task=worker pending=cancel-pending
//! [scope-cancelled] scope=root
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event descriptions
/// to stdout for debugging and demonstration purposes.
///
/// Not intended for production use — implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskSpawned => {
                if let (Some(task), Some(scope)) = (&e.task, &e.scope) {
                    println!("[spawned] task={task} scope={scope}");
                }
            }
            EventKind::TaskCompleted => {
                println!("[completed] task={:?}", e.task);
            }
            EventKind::TaskCancelled => {
                println!("[cancelled] task={:?}", e.task);
            }
            EventKind::TaskFailed => {
                println!("[failed] task={:?} err={:?}", e.task, e.reason);
            }
            EventKind::ScopeCancelled => {
                println!("[scope-cancelled] scope={:?}", e.scope);
            }
            EventKind::ScopeCompleted => {
                println!("[scope-completed] scope={:?}", e.scope);
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded] scope={:?} {:?}", e.scope, e.reason);
            }
            EventKind::DeadlineHit => {
                println!("[deadline-hit] task={:?} budget={:?}ms", e.task, e.timeout_ms);
            }
            EventKind::ShieldEntered => {
                println!("[shield-entered] task={:?} pending={:?}", e.task, e.reason);
            }
            EventKind::ShieldExited => {
                println!("[shield-exited] task={:?}", e.task);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
