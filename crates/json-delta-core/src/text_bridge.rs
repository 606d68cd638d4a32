//! Serializes a JSON array as newline-delimited JSON so line-mode text
//! diffing can be used as a list-diff strategy (`ListDmp` / `dL`).
//!
//! Each element is serialized compactly on its own line; a list diffed
//! this way must therefore not contain elements whose compact JSON
//! encoding itself contains a literal newline, which cannot occur for
//! any value `serde_json` produces.

use serde_json::Value;

use crate::error::DeltaError;

/// Joins a list's elements into newline-delimited JSON.
#[must_use]
pub fn to_lines(items: &[Value]) -> String {
    items.iter().map(|item| serde_json::to_string(item).unwrap_or_else(|_| "null".to_owned())).collect::<Vec<_>>().join("\n")
}

/// Splits newline-delimited JSON back into a list of values.
///
/// # Errors
///
/// Returns [`DeltaError::MalformedListText`] if a non-empty line fails to
/// parse as JSON.
pub fn from_lines(text: &str) -> Result<Vec<Value>, DeltaError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split('\n')
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| DeltaError::MalformedListText { reason: format!("{e} in line {line:?}") })
        })
        .collect()
}
