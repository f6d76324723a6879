//! Aggregate run reporting.
//!
//! All diagnostic text goes to standard output, captured tool stderr
//! included. Per-example diagnostics are buffered by the engine and printed
//! here in one block per example, so the output order is stable regardless
//! of worker-pool scheduling.

use crate::debug_session::DebugOutcome;
use crate::roundtrip::ExampleResult;
use anyhow::Result;
use serde::Serialize;

/// Final tallies for the run; decides the process exit status.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub failed: usize,
    pub debug: DebugOutcome,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.failed == 0 && self.debug != DebugOutcome::Failed
    }

    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.failed as f64 / self.total as f64
        }
    }
}

/// Print each example's diagnostics and verdict; returns the failed count.
pub fn print_example_results(results: &[ExampleResult]) -> usize {
    let mut failed = 0;
    for result in results {
        for line in &result.diagnostics {
            println!("{line}");
        }
        if result.passed() {
            println!("test {} passed", result.logical_name);
        } else {
            failed += 1;
            let phases: Vec<String> = result
                .failures
                .iter()
                .map(|failure| failure.to_string())
                .collect();
            println!("test {} failed ({})", result.logical_name, phases.join(", "));
        }
    }
    failed
}

/// Print the aggregate verdict, and the JSON summary when requested.
pub fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    match summary.debug {
        DebugOutcome::Skipped => println!("debug session skipped (no debug program)"),
        DebugOutcome::Passed => println!("debug session passed"),
        DebugOutcome::Failed => println!("debug session failed"),
    }
    if summary.failed > 0 {
        println!(
            "{} ({:.1}%) examples failed out of {}",
            summary.failed,
            summary.failure_rate(),
            summary.total
        );
    } else {
        println!("all {} examples passed", summary.total);
    }
    if json {
        println!("{}", serde_json::to_string(summary)?);
    }
    Ok(())
}
