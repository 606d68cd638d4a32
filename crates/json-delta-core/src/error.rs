use thiserror::Error;

use crate::value::ValueType;

/// Errors raised while applying or transforming a delta.
///
/// ```
/// # use json_delta_core::{apply_diff, op::Operation, textdiff::TextDiffConfig};
/// let err = apply_diff(&serde_json::json!("hi"), &Operation::IntegerDelta(1.0), &TextDiffConfig::default())
///     .unwrap_err();
/// assert!(matches!(err, json_delta_core::DeltaError::OpcodeTypeMismatch { .. }));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeltaError {
    /// An opcode was applied to a value of an incompatible type (e.g. `I`
    /// against a string). Rather than silently coercing, this is surfaced
    /// as a typed error since it indicates a corrupt or mis-targeted delta.
    #[error("opcode {op:?} cannot be applied to a {found} value")]
    OpcodeTypeMismatch {
        /// The opcode that could not be applied.
        op: &'static str,
        /// The type of the value it was applied to.
        found: ValueType,
    },
    /// A `d`/`dL` text delta string could not be decoded.
    #[error("malformed text delta: {reason}")]
    MalformedDelta {
        /// Description of the decoding failure.
        reason: String,
    },
    /// A list-mode text delta referenced a line that does not parse as
    /// JSON after re-splitting the patched text.
    #[error("malformed list text delta: {reason}")]
    MalformedListText {
        /// Description of the decoding failure.
        reason: String,
    },
}
