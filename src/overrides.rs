//! Execute-phase overrides keyed by logical name.
//!
//! A handful of examples need input on their standard input to run to
//! completion; everything else runs with stdin closed. The payloads mirror
//! what was typed when the examples were recorded, trailing newline
//! included.

use std::collections::HashMap;
use std::sync::OnceLock;

const STDIN_PAYLOADS: &[(&str, &str)] = &[("echo", "test message!\n")];

fn registry() -> &'static HashMap<&'static str, &'static [u8]> {
    static REGISTRY: OnceLock<HashMap<&'static str, &'static [u8]>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        STDIN_PAYLOADS
            .iter()
            .map(|(name, payload)| (*name, payload.as_bytes()))
            .collect()
    })
}

/// Return the stdin payload for an example, if one is registered.
pub fn stdin_override(logical_name: &str) -> Option<&'static [u8]> {
    registry().get(logical_name).copied()
}
