//! Interface tests for the registry and result reporting using Cucumber.
//!
//! ```bash
//! cargo test --test interfaces
//! KTF_LOG=debug cargo test --test interfaces
//! ```

mod steps;

use cucumber::World;
use steps::registry::RegistryWorld;
use steps::reporting::ReportingWorld;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    println!("\n=== Running Registry Interface Tests ===\n");
    RegistryWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/registry.feature")
        .await;

    println!("\n=== Running Reporting Interface Tests ===\n");
    ReportingWorld::cucumber()
        .fail_on_skipped()
        .run("tests/interfaces/features/reporting.feature")
        .await;
}
