use serde_json::{Map, Value};

use super::apply_diff;
use crate::error::DeltaError;
use crate::op::{Delta, Operation};
use crate::textdiff::TextDiffConfig;

/// Applies an object delta field by field.
///
/// # Errors
///
/// Propagates any [`DeltaError`] raised while applying a per-field
/// operation.
pub fn patch_object(map: &Map<String, Value>, delta: &Delta, cfg: &TextDiffConfig) -> Result<Map<String, Value>, DeltaError> {
    let mut result = map.clone();

    for (key, op) in delta.iter() {
        match op {
            Operation::Delete => {
                result.remove(key);
            }
            Operation::Insert(v) => {
                result.insert(key.clone(), v.clone());
            }
            other => {
                let current = result.get(key).cloned().unwrap_or(Value::Null);
                let patched = apply_diff(&current, other, cfg)?;
                result.insert(key.clone(), patched);
            }
        }
    }

    Ok(result)
}
