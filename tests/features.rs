//! Cucumber feature tests for crosscall orchestration.
//!
//! Run with:
//!
//! ```bash
//! cargo test --test features
//! ```

mod steps;

use cucumber::World;
use steps::orchestration::OrchestrationWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Orchestration Tests ===\n");
    OrchestrationWorld::cucumber()
        .fail_on_skipped()
        .run("tests/features/orchestration.feature")
        .await;
}
