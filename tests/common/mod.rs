//! Shared sandbox for integration tests.
//!
//! Each test gets a throwaway directory tree plus a mock toolchain script
//! standing in for the real vpu binary, and drives the harness binary
//! end-to-end through its CLI.

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Mock toolchain. Assembly prepends a magic header line and disassembly
/// strips it, so a disassemble/reassemble round trip reproduces the
/// assembled bytes exactly. Markers in the source drive failure injection:
///
/// - `BAD_ASSEMBLE`: assembly exits nonzero
/// - `BAD_EXEC`: execution exits nonzero
/// - `HANG_EXEC`: execution sleeps far beyond any test timeout
/// - `READS_STDIN`: execution requires the line "test message!" on stdin
const MOCK_TOOL: &str = r#"#!/bin/sh
mode="$1"; shift
case "$mode" in
-assemble)
    in="$1"; out="$3"
    if grep -q BAD_ASSEMBLE "$in" 2>/dev/null; then
        echo "mock assembler: refusing $in" >&2
        exit 1
    fi
    { printf 'VPUX\n'; cat "$in"; } > "$out"
    ;;
-disassemble)
    in="$1"; out="$3"
    tail -n +2 "$in" > "$out"
    ;;
-execute)
    in="$1"
    if grep -q BAD_EXEC "$in" 2>/dev/null; then
        echo "mock vm: trap at 0x0004" >&2
        exit 2
    fi
    if grep -q HANG_EXEC "$in" 2>/dev/null; then
        sleep 60 > /dev/null 2>&1
    fi
    if grep -q READS_STDIN "$in" 2>/dev/null; then
        read -r line
        [ "$line" = "test message!" ] || exit 3
    fi
    echo "ok"
    ;;
-debug)
    echo "vpu debugger ready"
    while read -r cmd; do
        echo "dbg> $cmd"
    done
    echo "session end"
    ;;
*)
    echo "mock vpu: unknown mode $mode" >&2
    exit 64
    ;;
esac
"#;

pub struct Sandbox {
    _temp: TempDir,
    pub build_root: PathBuf,
    pub examples_root: PathBuf,
    pub golden_root: PathBuf,
    pub debug_dir: PathBuf,
    tool: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create sandbox");
        let root = temp.path();
        let build_root = root.join("build");
        let examples_root = root.join("examples");
        let golden_root = root.join("goldens");
        let debug_dir = root.join("fixtures");
        for dir in [&examples_root, &golden_root, &debug_dir] {
            std::fs::create_dir_all(dir).expect("create sandbox dir");
        }

        let tool = root.join("mock-vpu.sh");
        std::fs::write(&tool, MOCK_TOOL).expect("write mock tool");
        set_executable(&tool);

        Self {
            _temp: temp,
            build_root,
            examples_root,
            golden_root,
            debug_dir,
            tool,
        }
    }

    pub fn write_example(&self, file_name: &str, contents: &str) {
        std::fs::write(self.examples_root.join(file_name), contents).expect("write example");
    }

    #[allow(dead_code)]
    pub fn write_debug_fixture(&self, file_name: &str, contents: &str) {
        std::fs::write(self.debug_dir.join(file_name), contents).expect("write debug fixture");
    }

    /// Run the harness binary against this sandbox.
    pub fn run(&self, record: bool, extra: &[&str]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_vharness"));
        cmd.arg(&self.build_root)
            .arg(&self.examples_root)
            .arg(&self.golden_root);
        if record {
            cmd.arg("record");
        }
        cmd.arg("--tool")
            .arg(self.tool.display().to_string())
            .arg("--debug-dir")
            .arg(&self.debug_dir);
        cmd.args(extra);
        cmd.output().expect("run harness")
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn set_executable(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod mock tool");
}

#[cfg(not(unix))]
fn set_executable(_path: &std::path::Path) {}

pub fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[allow(dead_code)]
pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
