//! # Example: deadline_guard
//!
//! Demonstrates both deadline policies on the same body.
//!
//! Shows how to:
//! - Bound a body with [`TaskContext::timeout`] (strict)
//! - Bound it with [`TaskContext::timeout_or_none`] (best-effort)
//! - Distinguish `DeadlineExceeded` from genuine failures at the join site
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► spawn "strict"       ─► ctx.timeout(1200ms, naps)    ─► Err(DeadlineExceeded)
//!   ├─► spawn "best-effort"  ─► ctx.timeout_or_none(1300ms)  ─► Ok(None)
//!   └─► spawn "fast"         ─► ctx.timeout(1300ms, one nap) ─► Ok("done")
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example deadline_guard
//! ```

use std::time::Duration;

use taskscope::{Scope, TaskError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== deadline_guard example ===\n");

    let scope = Scope::new();

    let strict = scope.spawn_named("strict", |ctx| async move {
        ctx.timeout(Duration::from_millis(1200), |g| async move {
            for i in 0..1000 {
                println!("strict: sleeping {i} ...");
                g.sleep(Duration::from_millis(500)).await?;
            }
            Ok(())
        })
        .await
    })?;

    match strict.join().await {
        Err(TaskError::DeadlineExceeded { budget }) => {
            println!("strict: gave up after {budget:?}\n");
        }
        other => println!("strict: unexpected outcome: {other:?}\n"),
    }

    let best_effort = scope.spawn_named("best-effort", |ctx| async move {
        ctx.timeout_or_none(Duration::from_millis(1300), |g| async move {
            for i in 0..1000 {
                println!("best-effort: sleeping {i} ...");
                g.sleep(Duration::from_millis(500)).await?;
            }
            Ok("done")
        })
        .await
    })?;

    println!("best-effort: result is {:?}\n", best_effort.join().await?);

    let fast = scope.spawn_named("fast", |ctx| async move {
        ctx.timeout(Duration::from_millis(1300), |g| async move {
            g.sleep(Duration::from_millis(500)).await?;
            Ok("done")
        })
        .await
    })?;

    println!("fast: result is {:?}", fast.join().await?);

    scope.join().await;
    Ok(())
}
