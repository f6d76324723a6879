//! CLI argument surface for the harness.
//!
//! The positional contract is the historical one: three roots, plus an
//! optional fourth token whose mere presence re-records golden artifacts.
//! Everything else is an option with a sensible default.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vharness",
    version,
    about = "Golden-file round-trip regression harness for the vpu toolchain",
    after_help = "Layout:\n  <BUILD_ROOT>/compiled      fresh assembled artifacts\n  <BUILD_ROOT>/decompiled    disassembly and round-trip scratch files\n  <GOLDEN_ROOT>/<name>.out   golden compiled artifact\n  <GOLDEN_ROOT>/<name>.txt   golden disassembly (with --check-disassembly)\n\nExamples:\n  vharness build examples goldens\n  vharness build examples goldens record\n  vharness build examples goldens --tool 'valgrind -q ./build/vpu'"
)]
pub struct HarnessArgs {
    /// Build output root holding the toolchain and scratch directories
    pub build_root: PathBuf,

    /// Directory of example sources, one test per file
    pub examples_root: PathBuf,

    /// Directory of golden artifacts, keyed by example name
    pub golden_root: PathBuf,

    /// Re-record golden artifacts instead of verifying (any value enables)
    #[arg(value_name = "RECORD")]
    pub record: Option<String>,

    /// Toolchain launcher: a command word plus optional wrapper arguments
    /// (default: <BUILD_ROOT>/vpu)
    #[arg(long, value_name = "CMD")]
    pub tool: Option<String>,

    /// Also verify (or record) golden disassembly text per example
    #[arg(long)]
    pub check_disassembly: bool,

    /// Worker threads for example verification (default: available cores)
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Kill a toolchain invocation after this many seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory holding the debug-session fixtures
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub debug_dir: PathBuf,

    /// Emit a machine-readable JSON summary as the final stdout line
    #[arg(long)]
    pub json: bool,
}
