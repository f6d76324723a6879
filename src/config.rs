//! Immutable run configuration.
//!
//! Built once from the CLI in `main` and passed by reference to every
//! component; nothing reads argv or ambient globals past this point.

use crate::cli::HarnessArgs;
use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Check fresh toolchain output against recorded golden artifacts.
    Verify,
    /// Re-record golden artifacts from fresh toolchain output.
    Record,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub build_root: PathBuf,
    pub examples_root: PathBuf,
    pub golden_root: PathBuf,
    pub mode: RunMode,
    /// Toolchain launcher argv: resolved command word plus wrapper arguments.
    pub tool_launcher: Vec<String>,
    pub check_disassembly: bool,
    pub jobs: usize,
    pub timeout: Duration,
    pub debug_dir: PathBuf,
    pub json: bool,
}

impl RunConfig {
    pub fn from_args(args: HarnessArgs) -> Result<Self> {
        let mode = if args.record.is_some() {
            RunMode::Record
        } else {
            RunMode::Verify
        };
        let tool_launcher = resolve_launcher(args.tool.as_deref(), &args.build_root)?;
        let jobs = args.jobs.unwrap_or_else(default_jobs).max(1);
        Ok(Self {
            build_root: args.build_root,
            examples_root: args.examples_root,
            golden_root: args.golden_root,
            mode,
            tool_launcher,
            check_disassembly: args.check_disassembly,
            jobs,
            timeout: Duration::from_secs(args.timeout_secs),
            debug_dir: args.debug_dir,
            json: args.json,
        })
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

/// Resolve the toolchain launcher into an argv vector.
///
/// Without `--tool` the launcher is the conventional `vpu` binary inside the
/// build root. A given launcher string is split into words (so wrapper
/// commands like `valgrind -q ./vpu` work); a bare command word is resolved
/// against PATH, anything path-shaped is used as written.
fn resolve_launcher(tool: Option<&str>, build_root: &Path) -> Result<Vec<String>> {
    let Some(raw) = tool else {
        let default = build_root.join("vpu");
        return Ok(vec![default.to_string_lossy().into_owned()]);
    };

    let mut words =
        shell_words::split(raw).with_context(|| format!("parse tool launcher: {raw}"))?;
    if words.is_empty() {
        bail!("tool launcher is empty");
    }
    if is_bare_command(&words[0]) {
        let resolved = which::which(&words[0])
            .with_context(|| format!("locate tool {} on PATH", words[0]))?;
        words[0] = resolved.to_string_lossy().into_owned();
    }
    Ok(words)
}

fn is_bare_command(word: &str) -> bool {
    let mut components = Path::new(word).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> HarnessArgs {
        HarnessArgs::parse_from(argv)
    }

    #[test]
    fn record_positional_switches_mode() {
        let verify = RunConfig::from_args(parse(&["vharness", "b", "e", "g"])).expect("config");
        assert_eq!(verify.mode, RunMode::Verify);

        let record =
            RunConfig::from_args(parse(&["vharness", "b", "e", "g", "record"])).expect("config");
        assert_eq!(record.mode, RunMode::Record);
    }

    #[test]
    fn default_launcher_lives_in_the_build_root() {
        let config = RunConfig::from_args(parse(&["vharness", "build", "e", "g"])).expect("config");
        assert_eq!(
            config.tool_launcher,
            [format!("build{}vpu", std::path::MAIN_SEPARATOR)]
        );
    }

    #[test]
    fn path_shaped_launcher_is_used_as_written() {
        let config = RunConfig::from_args(parse(&[
            "vharness", "b", "e", "g", "--tool", "./missing/vpu -x",
        ]))
        .expect("config");
        assert_eq!(config.tool_launcher, ["./missing/vpu", "-x"]);
    }

    #[test]
    fn bare_launcher_resolves_on_path() {
        // `sh` exists on every supported host.
        let config =
            RunConfig::from_args(parse(&["vharness", "b", "e", "g", "--tool", "sh"]))
                .expect("config");
        assert!(Path::new(&config.tool_launcher[0]).is_absolute());
    }

    #[test]
    fn missing_bare_launcher_is_a_config_error() {
        let result = RunConfig::from_args(parse(&[
            "vharness",
            "b",
            "e",
            "g",
            "--tool",
            "definitely-not-a-real-tool-name",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn jobs_never_drop_below_one() {
        let config =
            RunConfig::from_args(parse(&["vharness", "b", "e", "g", "--jobs", "0"]))
                .expect("config");
        assert_eq!(config.jobs, 1);
    }
}
