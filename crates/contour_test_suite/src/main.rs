//! Visual Test Runner
//!
//! Command-line tool for running visual regression tests for Contour.
//!
//! Usage:
//!   contour-visual-tests              # Run all tests
//!   contour-visual-tests --filter foo # Run tests matching "foo"
//!   contour-visual-tests --list       # List all tests
//!   contour-visual-tests --gpu        # Run on the wgpu backend

use anyhow::Result;
use clap::Parser;
use contour_test_suite::{
    runner::TestRunner, tests, BackendKind, TestHarness, TestHarnessConfig,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "contour-visual-tests")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Contour outline visual regression tests", long_about = None)]
struct Cli {
    /// List all test cases and exit
    #[arg(long)]
    list: bool,

    /// Only run tests whose name or suite contains this pattern
    #[arg(long)]
    filter: Option<String>,

    /// Render with the wgpu backend
    #[arg(long)]
    gpu: bool,

    /// Output directory for rendered images
    #[arg(long, default_value = "test_output")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.list {
        println!("Available test suites:");
        for suite in tests::all_suites() {
            println!("\n  {}:", suite.name);
            for case in &suite.cases {
                println!("    - {}", case.name);
            }
        }
        return Ok(());
    }

    println!("╔══════════════════════════════════════════╗");
    println!("║     CONTOUR VISUAL REGRESSION TESTS      ║");
    println!("╚══════════════════════════════════════════╝\n");

    let backend = if cli.gpu {
        BackendKind::Gpu
    } else {
        BackendKind::Software
    };
    let harness = TestHarness::with_config(TestHarnessConfig {
        reference_dir: cli.output.join("references").join(match backend {
            BackendKind::Software => "software",
            BackendKind::Gpu => "gpu",
        }),
        output_dir: cli.output.clone(),
        backend,
        ..Default::default()
    })?;
    let mut runner = TestRunner::with_harness(harness);

    for suite in tests::all_suites() {
        runner.add_suite(suite);
    }

    if let Some(ref pattern) = cli.filter {
        println!("Running tests matching: {}\n", pattern);
        runner.filter(pattern);
    }

    let result = runner.run();
    result.print_summary();

    if result.all_passed() {
        println!("\nAll tests passed!");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
