//! Applying a single [`Operation`] (or a whole [`Delta`]) to a value.

mod list;
mod object;

pub use list::patch_list;
pub use object::patch_object;

use serde_json::Value;

use crate::error::DeltaError;
use crate::op::Operation;
use crate::text_bridge;
use crate::textdiff::{self, TextDiffConfig};

/// Applies one [`Operation`] to `value`, returning the patched result.
///
/// # Errors
///
/// Returns [`DeltaError::OpcodeTypeMismatch`] if the opcode requires a
/// type `value` doesn't have (e.g. [`Operation::IntegerDelta`] against a
/// string), and [`DeltaError::MalformedDelta`] / [`DeltaError::MalformedListText`]
/// if an embedded text delta fails to decode.
pub fn apply_diff(value: &Value, op: &Operation, cfg: &TextDiffConfig) -> Result<Value, DeltaError> {
    match op {
        Operation::Insert(v) | Operation::Replace(v) => Ok(v.clone()),
        Operation::Delete => Ok(Value::Null),
        Operation::Unknown(_) => Ok(value.clone()),
        Operation::IntegerDelta(d) => {
            let n = value.as_f64().ok_or_else(|| type_mismatch("I", value))?;
            Ok(serde_json::Number::from_f64(n + d).map_or(Value::Null, Value::Number))
        }
        Operation::ObjectDiff(delta) => {
            let map = value.as_object().ok_or_else(|| type_mismatch("O", value))?;
            Ok(Value::Object(patch_object(map, delta, cfg)?))
        }
        Operation::ListDiff(delta) => {
            let items = value.as_array().ok_or_else(|| type_mismatch("L", value))?;
            Ok(Value::Array(patch_list(items, delta, cfg)?))
        }
        Operation::TextDelta(delta) => {
            let text = value.as_str().ok_or_else(|| type_mismatch("d", value))?;
            let diffs = textdiff::from_delta(text, delta)?;
            Ok(Value::String(textdiff::diff_text2(&diffs)))
        }
        Operation::ListTextDelta(delta) => {
            let items = value.as_array().ok_or_else(|| type_mismatch("dL", value))?;
            let text1 = text_bridge::to_lines(items);
            let diffs = textdiff::from_delta(&text1, delta)?;
            text_bridge::from_lines(&textdiff::diff_text2(&diffs))
                .map(Value::Array)
        }
    }
}

fn type_mismatch(op: &'static str, value: &Value) -> DeltaError {
    DeltaError::OpcodeTypeMismatch { op, found: crate::value::type_of(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;
    use serde_json::json;

    #[test]
    fn unknown_opcode_leaves_value_untouched() {
        let value = json!(42);
        let patched = apply_diff(&value, &Operation::Unknown("Z".into()), &TextDiffConfig::default()).unwrap();
        assert_eq!(patched, value);
    }

    #[test]
    fn integer_delta_requires_a_number() {
        let err = apply_diff(&json!("nope"), &Operation::IntegerDelta(1.0), &TextDiffConfig::default()).unwrap_err();
        assert!(matches!(err, DeltaError::OpcodeTypeMismatch { op: "I", found: ValueType::String }));
    }

    #[test]
    fn integer_delta_applies() {
        let patched = apply_diff(&json!(10), &Operation::IntegerDelta(-3.0), &TextDiffConfig::default()).unwrap();
        assert_eq!(patched, json!(7.0));
    }

    #[test]
    fn text_delta_applies_through_textdiff() {
        let diffs = textdiff::diff_main("hello", "hallo");
        let delta = textdiff::to_delta(&diffs);
        let patched =
            apply_diff(&json!("hello"), &Operation::TextDelta(delta), &TextDiffConfig::default()).unwrap();
        assert_eq!(patched, json!("hallo"));
    }
}
