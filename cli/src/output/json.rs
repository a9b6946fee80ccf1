//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the pretty printer for successful results.

use anyhow::{Context, Result};
use serde::Serialize;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "...",
///   "details": [...]
/// }
/// ```
///
/// `details` is omitted when empty.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str, details: &[String]) -> Result<String> {
    let mut obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    if !details.is_empty() {
        obj["details"] = serde_json::json!(details);
    }
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Pretty-print any serializable result.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_value<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("JSON serialization failed")
}
