//! Golden-file round-trip regression harness for the vpu toolchain.
//!
//! Verifies that assembling each example reproduces its golden artifact,
//! that disassembling and reassembling reproduces the same bytes, that the
//! compiled artifact executes cleanly, and that a scripted debugger session
//! replays its recorded transcript. A record pass regenerates the golden
//! artifacts instead of checking them.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod compare;
mod config;
mod debug_session;
mod discover;
mod invoke;
mod layout;
mod overrides;
mod report;
mod roundtrip;
mod util;

use config::RunConfig;
use invoke::Invoker;
use layout::Layout;
use report::RunSummary;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::HarnessArgs::parse();
    let config = RunConfig::from_args(args)?;
    let layout = Layout::new(&config);
    layout.ensure_dirs(config.mode)?;

    let examples = discover::discover(&config.examples_root)?;
    tracing::info!(total = examples.len(), mode = ?config.mode, "starting run");

    let invoker = Invoker::new(&config);
    let results = roundtrip::run_all(&config, &layout, &invoker, &examples);
    let failed = report::print_example_results(&results);
    let debug = debug_session::run(&config, &layout, &invoker)?;

    let summary = RunSummary {
        total: examples.len(),
        failed,
        debug,
    };
    report::print_summary(&summary, config.json)?;

    Ok(if summary.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
