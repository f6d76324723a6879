//! Round-trip verification engine.
//!
//! Five phases per example, in fixed order: assemble, golden compile check
//! (or re-record), disassemble, reassemble-and-compare, execute. Phases fail
//! independently and later phases still run, except where their input
//! artifact cannot exist: a failed assemble ends the example, a failed
//! disassemble skips only the reassemble check.
//!
//! Examples are mutually independent, so they run on a small worker pool;
//! every scratch path is derived from the example's own logical name and
//! results flow back through a channel to one aggregation point. Diagnostics
//! are buffered per example rather than printed in-flight so concurrent
//! examples never interleave their output.

use crate::compare::{self, CompareMode, ComparisonOutcome};
use crate::config::{RunConfig, RunMode};
use crate::discover::Example;
use crate::invoke::{Invoker, ToolInvocationResult};
use crate::layout::Layout;
use crate::overrides;
use crate::util::truncate_bytes;
use std::ffi::OsStr;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

const MAX_STDERR_SNIPPET_BYTES: usize = 2048;

/// One phase's failure within an example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseFailure {
    AssembleFailure,
    CompileMismatch,
    DisassembleFailure,
    DisassemblyMismatch,
    ReassembleMismatch,
    ExecuteFailure,
}

impl fmt::Display for PhaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PhaseFailure::AssembleFailure => "assemble failure",
            PhaseFailure::CompileMismatch => "compile mismatch",
            PhaseFailure::DisassembleFailure => "disassemble failure",
            PhaseFailure::DisassemblyMismatch => "disassembly mismatch",
            PhaseFailure::ReassembleMismatch => "reassemble mismatch",
            PhaseFailure::ExecuteFailure => "execute failure",
        };
        f.write_str(label)
    }
}

/// Accumulated outcome for one example. Owned by the engine while phases
/// run, then handed to the reporter.
#[derive(Debug)]
pub struct ExampleResult {
    pub logical_name: String,
    pub failures: Vec<PhaseFailure>,
    pub diagnostics: Vec<String>,
}

impl ExampleResult {
    fn new(logical_name: String) -> Self {
        Self {
            logical_name,
            failures: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn fail(&mut self, phase: PhaseFailure, lines: Vec<String>) {
        self.failures.push(phase);
        self.diagnostics.extend(lines);
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every example on the worker pool and return results sorted by
/// logical name.
pub fn run_all(
    config: &RunConfig,
    layout: &Layout,
    invoker: &Invoker,
    examples: &[Example],
) -> Vec<ExampleResult> {
    let jobs = if examples.is_empty() {
        1
    } else {
        config.jobs.min(examples.len())
    };
    let cursor = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel();

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            let sender = sender.clone();
            let cursor = &cursor;
            scope.spawn(move || loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(example) = examples.get(index) else {
                    break;
                };
                let result = run_example(config, layout, invoker, example);
                if sender.send(result).is_err() {
                    break;
                }
            });
        }
    });
    drop(sender);

    let mut results: Vec<ExampleResult> = receiver.into_iter().collect();
    results.sort_by(|a, b| a.logical_name.cmp(&b.logical_name));
    results
}

/// Run the five phases for one example.
pub fn run_example(
    config: &RunConfig,
    layout: &Layout,
    invoker: &Invoker,
    example: &Example,
) -> ExampleResult {
    let name = example.logical_name.as_str();
    let mut result = ExampleResult::new(example.logical_name.clone());
    let compiled = layout.compiled_path(name);

    // Phase 1: assemble. Without a compiled artifact nothing else can run.
    tracing::debug!(example = name, "assemble");
    let assembled = invoker.run(
        &[
            OsStr::new("-assemble"),
            example.source_path.as_os_str(),
            OsStr::new("-o"),
            compiled.as_os_str(),
        ],
        None,
        None,
    );
    if !assembled.success() {
        result.fail(
            PhaseFailure::AssembleFailure,
            tool_failure_lines("assemble", name, &assembled),
        );
        tracing::info!(example = name, "example failed to assemble");
        return result;
    }

    // Phase 2: golden compile check, or re-record.
    match config.mode {
        RunMode::Record => {
            let golden = layout.golden_compiled_path(name);
            if let Err(err) = std::fs::copy(&compiled, &golden) {
                result.fail(
                    PhaseFailure::CompileMismatch,
                    vec![format!(
                        "failed to record golden artifact for {name} at {}: {err}",
                        golden.display()
                    )],
                );
            }
        }
        RunMode::Verify => {
            let golden = layout.golden_compiled_path(name);
            if golden.is_file() {
                match compare::compare_files(&compiled, &golden, CompareMode::Binary) {
                    Ok(outcome) if outcome.equal => {}
                    Ok(outcome) => result.fail(
                        PhaseFailure::CompileMismatch,
                        mismatch_lines(
                            "compiled artifact drifted from golden",
                            name,
                            &outcome,
                            "fresh",
                            "golden",
                        ),
                    ),
                    Err(err) => result.fail(
                        PhaseFailure::CompileMismatch,
                        vec![format!("golden comparison failed for {name}: {err:#}")],
                    ),
                }
            } else {
                result.fail(
                    PhaseFailure::CompileMismatch,
                    vec![format!(
                        "no golden artifact for {name} at {}",
                        golden.display()
                    )],
                );
            }
        }
    }

    // Phase 3: disassemble the fresh artifact.
    tracing::debug!(example = name, "disassemble");
    let decompiled = layout.decompiled_path(name);
    let disassembled = invoker.run(
        &[
            OsStr::new("-disassemble"),
            compiled.as_os_str(),
            OsStr::new("-o"),
            decompiled.as_os_str(),
        ],
        None,
        None,
    );
    if !disassembled.success() {
        result.fail(
            PhaseFailure::DisassembleFailure,
            tool_failure_lines("disassemble", name, &disassembled),
        );
        // A tool that cannot even start will not start for any later phase.
        if !disassembled.started() {
            return result;
        }
    } else if config.check_disassembly {
        check_disassembly_golden(config, layout, name, &decompiled, &mut result);
    }

    // Phase 4: reassemble the disassembly and compare against the phase-1
    // artifact (not the golden one), skipped when there is no disassembly.
    if disassembled.success() {
        tracing::debug!(example = name, "reassemble");
        let reassembled_path = layout.reassembled_path(name);
        let reassembled = invoker.run(
            &[
                OsStr::new("-assemble"),
                decompiled.as_os_str(),
                OsStr::new("-o"),
                reassembled_path.as_os_str(),
            ],
            None,
            None,
        );
        if !reassembled.success() {
            result.fail(
                PhaseFailure::ReassembleMismatch,
                tool_failure_lines("reassemble", name, &reassembled),
            );
            if !reassembled.started() {
                return result;
            }
        } else {
            match compare::compare_files(&reassembled_path, &compiled, CompareMode::Binary) {
                Ok(outcome) if outcome.equal => {}
                Ok(outcome) => result.fail(
                    PhaseFailure::ReassembleMismatch,
                    mismatch_lines(
                        "round-trip artifact differs from the original",
                        name,
                        &outcome,
                        "reassembled",
                        "original",
                    ),
                ),
                Err(err) => result.fail(
                    PhaseFailure::ReassembleMismatch,
                    vec![format!("round-trip comparison failed for {name}: {err:#}")],
                ),
            }
        }
    }

    // Phase 5: execute, delivering any registered stdin payload.
    tracing::debug!(example = name, "execute");
    let stdin = overrides::stdin_override(name);
    let executed = invoker.run(&[OsStr::new("-execute"), compiled.as_os_str()], stdin, None);
    if !executed.success() {
        result.fail(
            PhaseFailure::ExecuteFailure,
            tool_failure_lines("execute", name, &executed),
        );
    }

    tracing::info!(example = name, passed = result.passed(), "example complete");
    result
}

fn check_disassembly_golden(
    config: &RunConfig,
    layout: &Layout,
    name: &str,
    decompiled: &std::path::Path,
    result: &mut ExampleResult,
) {
    let golden = layout.golden_disassembly_path(name);
    match config.mode {
        RunMode::Record => {
            if let Err(err) = std::fs::copy(decompiled, &golden) {
                result.fail(
                    PhaseFailure::DisassemblyMismatch,
                    vec![format!(
                        "failed to record golden disassembly for {name} at {}: {err}",
                        golden.display()
                    )],
                );
            }
        }
        RunMode::Verify => {
            if golden.is_file() {
                match compare::compare_files(decompiled, &golden, CompareMode::Text) {
                    Ok(outcome) if outcome.equal => {}
                    Ok(outcome) => result.fail(
                        PhaseFailure::DisassemblyMismatch,
                        mismatch_lines(
                            "disassembly drifted from golden",
                            name,
                            &outcome,
                            "fresh",
                            "golden",
                        ),
                    ),
                    Err(err) => result.fail(
                        PhaseFailure::DisassemblyMismatch,
                        vec![format!(
                            "golden disassembly comparison failed for {name}: {err:#}"
                        )],
                    ),
                }
            } else {
                result.fail(
                    PhaseFailure::DisassemblyMismatch,
                    vec![format!(
                        "no golden disassembly for {name} at {}",
                        golden.display()
                    )],
                );
            }
        }
    }
}

fn tool_failure_lines(what: &str, name: &str, result: &ToolInvocationResult) -> Vec<String> {
    let mut lines = vec![format!("{what} failed for {name} ({})", result.status)];
    if result.started() {
        let stderr = truncate_bytes(&result.stderr, MAX_STDERR_SNIPPET_BYTES);
        let stderr = stderr.trim_end();
        if !stderr.is_empty() {
            lines.push(format!("  stderr: {stderr}"));
        }
    }
    lines
}

fn mismatch_lines(
    what: &str,
    name: &str,
    outcome: &ComparisonOutcome,
    label_a: &str,
    label_b: &str,
) -> Vec<String> {
    let mut lines = vec![format!("{what} for {name}")];
    lines.extend(outcome.render(label_a, label_b));
    lines
}
