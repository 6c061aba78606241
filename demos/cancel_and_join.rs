//! # Example: cancel_and_join
//!
//! Demonstrates cooperative cancellation of a running task.
//!
//! Shows how to:
//! - Spawn a long-running task under a [`Scope`]
//! - Cancel it programmatically via the [`TaskHandle`]
//! - Observe the lifecycle through the built-in [`LogWriter`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Scope::with_config(cfg, [LogWriter])
//!   ├─► spawn "sleeper"  (loops in ctx.sleep)
//!   │      └─► publish TaskSpawned
//!   ├─► sleep 1300ms (let the task run)
//!   ├─► handle.cancel_and_join()
//!   │      ├─► token cancelled
//!   │      ├─► body's sleep observes it ─► Err(Canceled)
//!   │      └─► publish TaskCancelled
//!   └─► scope.join()  ─► publish ScopeCompleted
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_and_join --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskscope::{LogWriter, Scope, ScopeConfig, Subscribe, TaskError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== cancel_and_join example ===\n");

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let scope = Scope::with_config(ScopeConfig::default(), subs);

    let sleeper = scope.spawn_named("sleeper", |ctx| async move {
        for i in 0..1000 {
            println!("sleeper: nap {i} ...");
            ctx.sleep(Duration::from_millis(500)).await?;
        }
        Ok(())
    })?;

    tokio::time::sleep(Duration::from_millis(1300)).await;
    println!("main: tired of waiting, cancelling");

    match sleeper.cancel_and_join().await {
        Err(TaskError::Canceled) => println!("main: sleeper cancelled cleanly"),
        other => println!("main: unexpected outcome: {other:?}"),
    }

    scope.join().await;
    println!("main: now I can quit");
    Ok(())
}
