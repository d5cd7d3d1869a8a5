//! Test runner for executing test suites
//!
//! Manages test execution, result collection, and reporting.

use crate::harness::{TestContext, TestHarness, TestResult};
use anyhow::Result;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// A single test case
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Test category
    pub category: String,
    /// Scene setup
    pub test_fn: Box<dyn FnOnce(&mut TestContext) + Send>,
}

impl TestCase {
    pub fn new<F>(name: &str, category: &str, test_fn: F) -> Self
    where
        F: FnOnce(&mut TestContext) + Send + 'static,
    {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            test_fn: Box::new(test_fn),
        }
    }
}

/// Result of running a test
pub struct TestRun {
    /// Test name
    pub name: String,
    /// Test category
    pub category: String,
    /// Test result
    pub result: TestResult,
    /// Time taken
    pub duration: Duration,
}

impl TestRun {
    pub fn is_passed(&self) -> bool {
        self.result.is_passed()
    }
}

/// Test suite containing multiple test cases
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Test cases
    pub cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cases: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, name: &str, test_fn: F) -> &mut Self
    where
        F: FnOnce(&mut TestContext) + Send + 'static,
    {
        self.cases.push(TestCase::new(name, &self.name, test_fn));
        self
    }
}

/// Test runner for executing suites
pub struct TestRunner {
    /// Test harness
    harness: TestHarness,
    /// Test suites to run
    suites: Vec<TestSuite>,
    /// Filter pattern (None = run all)
    filter: Option<String>,
}

impl TestRunner {
    /// Create a new test runner on the software backend
    pub fn new() -> Result<Self> {
        Ok(Self::with_harness(TestHarness::new()?))
    }

    /// Create with custom harness
    pub fn with_harness(harness: TestHarness) -> Self {
        Self {
            harness,
            suites: Vec::new(),
            filter: None,
        }
    }

    /// Add a test suite
    pub fn add_suite(&mut self, suite: TestSuite) -> &mut Self {
        self.suites.push(suite);
        self
    }

    /// Set a filter pattern
    pub fn filter(&mut self, pattern: &str) -> &mut Self {
        self.filter = Some(pattern.to_string());
        self
    }

    /// Run all tests
    pub fn run(&mut self) -> RunResult {
        let start = Instant::now();
        let mut results = Vec::new();

        for suite in self.suites.drain(..) {
            tracing::info!("Running suite: {}", suite.name);

            for case in suite.cases {
                if let Some(ref pattern) = self.filter {
                    if !case.name.contains(pattern) && !case.category.contains(pattern) {
                        continue;
                    }
                }

                let test_start = Instant::now();
                let full_name = format!("{}::{}", case.category, case.name);

                tracing::debug!("Running test: {}", full_name);

                let result = match self.harness.run_test(&full_name, case.test_fn) {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!("Test {} failed with error: {:#}", full_name, e);
                        TestResult::Failed {
                            difference: 1.0,
                            diff_path: self.harness.diff_path(&full_name),
                        }
                    }
                };

                let duration = test_start.elapsed();
                match &result {
                    TestResult::Passed | TestResult::PassedWithNewReference => {
                        tracing::info!("  ✓ {} ({:?})", case.name, duration)
                    }
                    TestResult::Skipped { reason } => {
                        tracing::info!("  - {} skipped: {}", case.name, reason)
                    }
                    TestResult::Failed { .. } => {
                        tracing::error!("  ✗ {} ({:?})", case.name, duration)
                    }
                }

                results.push(TestRun {
                    name: case.name,
                    category: case.category,
                    result,
                    duration,
                });
            }
        }

        RunResult::new(results, start.elapsed())
    }

    /// Get the harness
    pub fn harness(&self) -> &TestHarness {
        &self.harness
    }
}

/// Results from running tests
pub struct RunResult {
    /// Individual test results
    pub results: Vec<TestRun>,
    /// Total time taken
    pub duration: Duration,
}

impl RunResult {
    pub fn new(results: Vec<TestRun>, duration: Duration) -> Self {
        Self { results, duration }
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    /// Cases that ran and did not match their reference
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, TestResult::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, TestResult::Skipped { .. }))
            .count()
    }

    /// References written by this run
    pub fn new_references(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.result, TestResult::PassedWithNewReference))
            .count()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// No case failed; skipped cases do not count against the run
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// `(passed, total)` per suite
    pub fn by_category(&self) -> BTreeMap<&str, (usize, usize)> {
        let mut map: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for run in &self.results {
            let entry = map.entry(run.category.as_str()).or_default();
            entry.0 += run.is_passed() as usize;
            entry.1 += 1;
        }
        map
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════╗");
        println!("║           TEST RESULTS SUMMARY           ║");
        println!("╠══════════════════════════════════════════╣");
        for (category, (passed, total)) in self.by_category() {
            println!("║  {:<24} {:>5} / {:<5}    ║", category, passed, total);
        }
        println!("╠══════════════════════════════════════════╣");
        println!("║  Passed:  {:>5}  (new references: {:>4}) ║", self.passed(), self.new_references());
        println!("║  Failed:  {:>5}                          ║", self.failed());
        println!("║  Skipped: {:>5}                          ║", self.skipped());
        println!("║  Time:    {:>8.2?}                      ║", self.duration);
        println!("╚══════════════════════════════════════════╝");

        for run in &self.results {
            match &run.result {
                TestResult::Failed {
                    difference,
                    diff_path,
                } => println!(
                    "  ✗ {}::{} ({:.3}% different, see {:?})",
                    run.category,
                    run.name,
                    difference * 100.0,
                    diff_path
                ),
                TestResult::Skipped { reason } => {
                    println!("  - {}::{} skipped: {}", run.category, run.name, reason)
                }
                TestResult::Passed | TestResult::PassedWithNewReference => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn run(category: &str, result: TestResult) -> TestRun {
        TestRun {
            name: "case".to_string(),
            category: category.to_string(),
            result,
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_counts() {
        let result = RunResult::new(
            vec![
                run("jump_flood", TestResult::Passed),
                run("jump_flood", TestResult::PassedWithNewReference),
                run(
                    "compositing",
                    TestResult::Failed {
                        difference: 0.5,
                        diff_path: PathBuf::from("diff.png"),
                    },
                ),
                run(
                    "compositing",
                    TestResult::Skipped {
                        reason: "no adapter".to_string(),
                    },
                ),
            ],
            Duration::ZERO,
        );

        assert_eq!(result.passed(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.skipped(), 1);
        assert_eq!(result.new_references(), 1);
        assert!(!result.all_passed());
        assert_eq!(result.by_category()["jump_flood"], (2, 2));
        assert_eq!(result.by_category()["compositing"], (0, 2));
    }

    #[test]
    fn test_suite_cases_carry_category() {
        let mut suite = TestSuite::new("silhouette");
        suite.add("single_rect", |_| {}).add("msaa_circle", |_| {});
        assert_eq!(suite.cases.len(), 2);
        assert_eq!(suite.cases[1].category, "silhouette");
    }
}
