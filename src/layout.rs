//! Typed paths into the harness file layout.
//!
//! Centralizing path construction keeps artifact naming consistent between
//! the record and verify passes and prevents drift when the layout evolves.
//! Every scratch file name is derived from the owning example's logical
//! name, so concurrent examples never share a path.

use crate::config::{RunConfig, RunMode};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fixed debug-session fixture names, resolved against the debug directory.
const DEBUG_PROGRAM: &str = "debug.out";
const DEBUG_INPUT: &str = "debug.in";
const DEBUG_TRANSCRIPT: &str = "debug.transcript";

#[derive(Debug, Clone)]
pub struct Layout {
    build_root: PathBuf,
    golden_root: PathBuf,
    debug_dir: PathBuf,
}

impl Layout {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            build_root: config.build_root.clone(),
            golden_root: config.golden_root.clone(),
            debug_dir: config.debug_dir.clone(),
        }
    }

    /// Return the directory for freshly assembled artifacts.
    pub fn compiled_dir(&self) -> PathBuf {
        self.build_root.join("compiled")
    }

    /// Return the directory for disassembly and round-trip scratch files.
    pub fn decompiled_dir(&self) -> PathBuf {
        self.build_root.join("decompiled")
    }

    /// Return the fresh compiled artifact path for an example.
    pub fn compiled_path(&self, logical_name: &str) -> PathBuf {
        self.compiled_dir().join(format!("{logical_name}.out"))
    }

    /// Return the fresh disassembly path for an example.
    pub fn decompiled_path(&self, logical_name: &str) -> PathBuf {
        self.decompiled_dir().join(format!("{logical_name}.txt"))
    }

    /// Return the reassembled round-trip scratch path for an example.
    pub fn reassembled_path(&self, logical_name: &str) -> PathBuf {
        self.decompiled_dir().join(format!("{logical_name}.rt.out"))
    }

    /// Return the golden compiled artifact path for an example.
    pub fn golden_compiled_path(&self, logical_name: &str) -> PathBuf {
        self.golden_root.join(format!("{logical_name}.out"))
    }

    /// Return the golden disassembly path for an example.
    pub fn golden_disassembly_path(&self, logical_name: &str) -> PathBuf {
        self.golden_root.join(format!("{logical_name}.txt"))
    }

    /// Return the compiled debug program fixture path.
    pub fn debug_program_path(&self) -> PathBuf {
        self.debug_dir.join(DEBUG_PROGRAM)
    }

    /// Return the recorded debugger input fixture path.
    pub fn debug_input_path(&self) -> PathBuf {
        self.debug_dir.join(DEBUG_INPUT)
    }

    /// Return the golden debug transcript path.
    pub fn debug_transcript_path(&self) -> PathBuf {
        self.debug_dir.join(DEBUG_TRANSCRIPT)
    }

    /// Return the scratch path the fresh debug capture is redirected to.
    pub fn debug_capture_path(&self) -> PathBuf {
        self.decompiled_dir().join("debug.capture")
    }

    /// Create the output directories the run writes into. Idempotent.
    pub fn ensure_dirs(&self, mode: RunMode) -> Result<()> {
        for dir in [self.compiled_dir(), self.decompiled_dir()] {
            create_dir(&dir)?;
        }
        if mode == RunMode::Record {
            create_dir(&self.golden_root)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))
}
