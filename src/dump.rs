//! Best-effort response-body dumper for development builds.
//!
//! Diagnostics only: nothing here can fail, block, or alter control flow.
//! Release builds skip the parse entirely.

use serde_json::Value;
use tracing::debug;

/// Pretty-prints `bytes` as JSON, if that is what they are.
///
/// Returns `None` for anything that is not valid JSON — including invalid
/// UTF-8 — rather than erroring.
pub fn pretty(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// Logs a pretty-printed view of a response body in debug builds.
///
/// Non-JSON bodies log a byte count instead. In release builds this is a
/// no-op.
pub fn dump(label: &str, bytes: &[u8]) {
    if !cfg!(debug_assertions) {
        return;
    }
    match pretty(bytes) {
        Some(text) => debug!(%label, "response body:\n{text}"),
        None => debug!(%label, len = bytes.len(), "response body is not JSON"),
    }
}
