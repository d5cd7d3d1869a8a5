//! Contour Visual Test Suite
//!
//! Visual regression tests for jump flood outline rendering. Each case
//! builds a scene, runs the outline pass and compares the camera color
//! target against a reference PNG.
//!
//! # Features
//!
//! - `gpu` - Run the cases on the wgpu backend (requires a GPU adapter)

pub mod harness;
pub mod runner;
pub mod tests;

pub use harness::{BackendKind, TestContext, TestHarness, TestHarnessConfig, TestResult};
pub use runner::TestRunner;
