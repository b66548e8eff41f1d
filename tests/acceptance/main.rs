//! Acceptance tests using cucumber-rs (Gherkin).
//!
//! Drives the REST API through `ActivationService` and the real HTTP
//! actuator client against an in-process actuator stub:
//!
//! ```bash
//! cargo test --test acceptance
//! ```

mod steps;

use cucumber::World;
use steps::activation::ActivationWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Activation Acceptance Tests ===\n");
    ActivationWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/acceptance/features/activation.feature")
        .await;
}
