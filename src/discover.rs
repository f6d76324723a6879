//! Example discovery.
//!
//! One test per regular file directly inside the examples root, no
//! recursion. The logical name is the file stem and keys every derived
//! artifact, so two sources sharing a stem would silently overwrite each
//! other's golden data; discovery rejects that instead of proceeding.

use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One test scenario: a source file plus its derived logical name.
#[derive(Debug, Clone)]
pub struct Example {
    pub logical_name: String,
    pub source_path: PathBuf,
}

/// Enumerate examples under `examples_root`, sorted by logical name.
pub fn discover(examples_root: &Path) -> Result<Vec<Example>> {
    let entries = std::fs::read_dir(examples_root)
        .with_context(|| format!("read examples root {}", examples_root.display()))?;

    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut examples = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("scan examples root {}", examples_root.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        let logical_name = stem.to_string_lossy().into_owned();
        if let Some(previous) = seen.insert(logical_name.clone(), path.clone()) {
            bail!(
                "examples {} and {} share the logical name {logical_name}; \
                 their golden artifacts would collide",
                previous.display(),
                path.display()
            );
        }
        examples.push(Example {
            logical_name,
            source_path: path,
        });
    }

    examples.sort_by(|a, b| a.logical_name.cmp(&b.logical_name));
    Ok(examples)
}
