//! Debug-session transcript replay.
//!
//! A single fixed scenario, run after all examples: feed the recorded input
//! to the debugger and capture its transcript from standard output. Record
//! mode persists the capture as the golden transcript; verify mode compares
//! against it. A missing debug program means no scenario is configured and
//! the session is skipped; a missing input or golden transcript with the
//! program present is a misconfiguration and aborts the run.
//!
//! The debugger is invoked with `-0` so the transcript never embeds the
//! fixture's host path.

use crate::compare::{self, CompareMode};
use crate::config::{RunConfig, RunMode};
use crate::invoke::Invoker;
use crate::layout::Layout;
use crate::util::truncate_bytes;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::ffi::OsStr;

const MAX_STDERR_SNIPPET_BYTES: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugOutcome {
    /// No debug program fixture; the run outcome rests on the examples.
    Skipped,
    Passed,
    Failed,
}

/// Run the debug session for the configured mode.
///
/// Fixture errors terminate the run; a failing debugger or a drifted
/// transcript is an ordinary `Failed` outcome.
pub fn run(config: &RunConfig, layout: &Layout, invoker: &Invoker) -> Result<DebugOutcome> {
    let program = layout.debug_program_path();
    if !program.is_file() {
        tracing::info!(program = %program.display(), "no debug program, skipping debug session");
        return Ok(DebugOutcome::Skipped);
    }

    let input_path = layout.debug_input_path();
    let input = std::fs::read(&input_path).with_context(|| {
        format!(
            "debug program {} is present but its input {} is not readable",
            program.display(),
            input_path.display()
        )
    })?;

    let capture = layout.debug_capture_path();
    tracing::debug!(program = %program.display(), "debug replay");
    let invoked = invoker.run(
        &[OsStr::new("-debug"), program.as_os_str(), OsStr::new("-0")],
        Some(&input),
        Some(&capture),
    );
    if !invoked.success() {
        println!("debug session invocation failed ({})", invoked.status);
        if invoked.started() {
            let stderr = truncate_bytes(&invoked.stderr, MAX_STDERR_SNIPPET_BYTES);
            let stderr = stderr.trim_end();
            if !stderr.is_empty() {
                println!("  stderr: {stderr}");
            }
        }
        return Ok(DebugOutcome::Failed);
    }

    let transcript = layout.debug_transcript_path();
    match config.mode {
        RunMode::Record => {
            std::fs::copy(&capture, &transcript).with_context(|| {
                format!("record debug transcript to {}", transcript.display())
            })?;
            println!("recorded debug transcript to {}", transcript.display());
            Ok(DebugOutcome::Passed)
        }
        RunMode::Verify => {
            if !transcript.is_file() {
                bail!(
                    "no golden debug transcript at {}; run a record pass first",
                    transcript.display()
                );
            }
            let outcome = compare::compare_files(&capture, &transcript, CompareMode::Text)?;
            if outcome.equal {
                Ok(DebugOutcome::Passed)
            } else {
                println!("debug transcript drifted from golden");
                for line in outcome.render("fresh", "golden") {
                    println!("{line}");
                }
                Ok(DebugOutcome::Failed)
            }
        }
    }
}
