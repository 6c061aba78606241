//! # Example: resource_cleanup
//!
//! Demonstrates the deadline-vs-acquisition race and why the guard's caller
//! owns any value that actually comes back.
//!
//! Shows how to:
//! - Run many deadline-guarded acquisitions concurrently
//! - Release late-arriving resources on the expiry path
//! - Use a shielded section so cleanup survives cancellation
//! - Verify the pool ends balanced
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► spawn 10_000 tasks, each:
//!   │     ├─► with_deadline(60ms, BestEffort, delay(50ms) then acquire)
//!   │     ├─► Completed(resource) ─► shield ─► resource.close()
//!   │     └─► TimedOut            ─► nothing was acquired
//!   ├─► scope.join()
//!   └─► assert pool.in_flight() == 0
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --release --example resource_cleanup
//! ```

use std::time::Duration;

use taskscope::{with_deadline, DeadlineOutcome, DeadlinePolicy, ResourcePool, Scope};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== resource_cleanup example ===\n");

    let pool = ResourcePool::new();
    let scope = Scope::new();

    for _ in 0..10_000 {
        let p = pool.clone();
        scope.spawn(move |ctx| async move {
            let outcome = with_deadline(
                &ctx,
                Duration::from_millis(60),
                DeadlinePolicy::BestEffort,
                |_g| async move {
                    // The acquisition itself is not a checkpoint, so it can
                    // land after the deadline has already fired.
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(p.acquire())
                },
            )
            .await?;

            if let DeadlineOutcome::Completed(resource) = outcome {
                // Cleanup is shielded: it finishes even if this task gets
                // cancelled while closing.
                ctx.shield(|_s| async move { resource.close() }).await;
            }
            Ok(())
        })?;
    }

    scope.join().await;
    println!("still acquired: {}", pool.in_flight());
    assert_eq!(pool.in_flight(), 0);
    Ok(())
}
