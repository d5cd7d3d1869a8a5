//! Visual test cases organized by category

pub mod orchestrator;
pub mod silhouette;

use crate::runner::TestSuite;

/// Create all test suites
pub fn all_suites() -> Vec<TestSuite> {
    vec![
        silhouette::suite(),
        jump_flood::suite(),
        compositing::suite(),
        orchestrator::suite(),
    ]
}
