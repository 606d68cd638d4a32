use serde_json::Value;

use super::apply_diff;
use crate::error::DeltaError;
use crate::op::{parse_index, Delta, Operation};
use crate::textdiff::TextDiffConfig;

/// Applies a list delta produced by [`crate::diff::diff_lists`].
///
/// Deletes and in-place edits are keyed by their index in the original
/// list; inserts are keyed by their target index in the final list.
/// In-place edits and deletes are applied first (against the original
/// indices, descending for deletes so earlier indices stay valid), then
/// inserts are applied ascending against the now-shortened list.
///
/// # Errors
///
/// Propagates any [`DeltaError`] raised while applying an in-place edit.
/// Keys that don't parse as an index, or indices past the end of the
/// list, are skipped rather than treated as an error.
pub fn patch_list(items: &[Value], delta: &Delta, cfg: &TextDiffConfig) -> Result<Vec<Value>, DeltaError> {
    let mut result = items.to_vec();

    let mut recurse_ops = Vec::new();
    let mut delete_indices = Vec::new();
    let mut insert_ops = Vec::new();

    for (key, op) in delta.iter() {
        let Some(index) = parse_index(key) else { continue };
        match op {
            Operation::Delete => delete_indices.push(index),
            Operation::Insert(value) => insert_ops.push((index, value)),
            other => recurse_ops.push((index, other)),
        }
    }

    for (index, op) in recurse_ops {
        if let Some(slot) = result.get(index) {
            result[index] = apply_diff(slot, op, cfg)?;
        }
    }

    delete_indices.sort_unstable_by(|a, b| b.cmp(a));
    for index in delete_indices {
        if index < result.len() {
            result.remove(index);
        }
    }

    insert_ops.sort_unstable_by_key(|(index, _)| *index);
    for (index, value) in insert_ops {
        let at = index.min(result.len());
        result.insert(at, value.clone());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_delete_and_recurse_roundtrip_diff_lists() {
        let a = vec![json!(1), json!({"x": 1}), json!(3), json!(4)];
        let b = vec![json!(1), json!({"x": 2}), json!(4), json!(5)];
        let delta = crate::diff::diff_lists(&a, &b, &crate::policy::Policy::new(), &TextDiffConfig::default());
        let patched = patch_list(&a, &delta, &TextDiffConfig::default()).unwrap();
        assert_eq!(patched, b);
    }

    #[test]
    fn out_of_range_delete_is_ignored() {
        let a = vec![json!(1)];
        let delta = Delta::from_entries([("5".to_owned(), Operation::Delete)]);
        assert_eq!(patch_list(&a, &delta, &TextDiffConfig::default()).unwrap(), a);
    }
}
