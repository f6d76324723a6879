//! Byte-exact comparison with divergence localization.
//!
//! Golden checking lives or dies on exact equality, so comparison is always
//! byte-for-byte; the mode only changes how the first divergence is reported.
//! Text mode decodes context as UTF-8 (lossily) and tracks line/column over
//! the common prefix, binary mode reports a hex window.

use anyhow::{Context, Result};
use std::path::Path;

/// Units of context shown on each side of the first differing offset.
const CONTEXT_WINDOW: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Binary,
    Text,
}

/// Result of comparing two opaque streams.
///
/// `line` and `column` are populated in text mode only. The line count is
/// 1-based; the column resets to zero after every newline.
#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub equal: bool,
    pub first_diff_offset: Option<usize>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub context_a: Option<String>,
    pub context_b: Option<String>,
}

impl ComparisonOutcome {
    fn equal() -> Self {
        Self {
            equal: true,
            first_diff_offset: None,
            line: None,
            column: None,
            context_a: None,
            context_b: None,
        }
    }

    /// Render mismatch diagnostics, labeling each side's context window.
    /// Only meaningful when `equal` is false.
    pub fn render(&self, label_a: &str, label_b: &str) -> Vec<String> {
        let offset = self.first_diff_offset.unwrap_or(0);
        let mut lines = Vec::new();
        match (self.line, self.column) {
            (Some(line), Some(column)) => lines.push(format!(
                "  first difference at line {line}, column {column} (byte offset {offset})"
            )),
            _ => lines.push(format!("  first difference at byte offset {offset}")),
        }
        if let (Some(context_a), Some(context_b)) = (&self.context_a, &self.context_b) {
            lines.push(format!("  {label_a}: {context_a}"));
            lines.push(format!("  {label_b}: {context_b}"));
        }
        lines
    }
}

/// Compare two streams for exact equality.
///
/// Equality requires identical length and identical bytes. The first
/// difference is located within the overlapping prefix; when one input is a
/// strict prefix of the other, the divergence offset is the shorter length.
pub fn compare(a: &[u8], b: &[u8], mode: CompareMode) -> ComparisonOutcome {
    let mismatch = a.iter().zip(b.iter()).position(|(x, y)| x != y);
    let offset = match mismatch {
        Some(offset) => offset,
        None if a.len() != b.len() => a.len().min(b.len()),
        None => return ComparisonOutcome::equal(),
    };

    let (line, column) = match mode {
        CompareMode::Binary => (None, None),
        CompareMode::Text => {
            let mut line = 1usize;
            let mut column = 0usize;
            for &byte in &a[..offset.min(a.len())] {
                if byte == b'\n' {
                    line += 1;
                    column = 0;
                } else {
                    column += 1;
                }
            }
            (Some(line), Some(column))
        }
    };

    ComparisonOutcome {
        equal: false,
        first_diff_offset: Some(offset),
        line,
        column,
        context_a: Some(render_window(window(a, offset), mode)),
        context_b: Some(render_window(window(b, offset), mode)),
    }
}

/// Compare two files by content.
pub fn compare_files(a: &Path, b: &Path, mode: CompareMode) -> Result<ComparisonOutcome> {
    let bytes_a = std::fs::read(a).with_context(|| format!("read {}", a.display()))?;
    let bytes_b = std::fs::read(b).with_context(|| format!("read {}", b.display()))?;
    Ok(compare(&bytes_a, &bytes_b, mode))
}

fn window(data: &[u8], offset: usize) -> &[u8] {
    let start = offset.saturating_sub(CONTEXT_WINDOW);
    let end = offset.saturating_add(CONTEXT_WINDOW).min(data.len());
    &data[start.min(data.len())..end]
}

fn render_window(bytes: &[u8], mode: CompareMode) -> String {
    match mode {
        CompareMode::Text => {
            let text = String::from_utf8_lossy(bytes);
            format!("\"{}\"", text.escape_debug())
        }
        CompareMode::Binary => {
            let hex: Vec<String> = bytes.iter().map(|byte| format!("{byte:02x}")).collect();
            hex.join(" ")
        }
    }
}
