//! Operational transform: rebasing one party's delta against a
//! concurrently-applied delta from another party so that applying both
//! (in either order, against the original base) converges.

mod list;
mod object;

pub use list::transform_list;
pub use object::transform_object;

use serde_json::Value;

use crate::op::Operation;
use crate::policy::Policy;
use crate::text_bridge;
use crate::textdiff::{self, TextDiffConfig};

/// Rebases `local` against `remote`, both diffed from the same `base`
/// value, so that applying `remote` then the result converges with
/// applying `local` then the symmetric transform of `remote` against
/// `local`.
///
/// Any opcode combination without a defined merge (including outright
/// conflicts, e.g. both sides replacing the same scalar with different
/// content) leaves local's operation as-is: local's intent is never
/// silently discarded just because remote also touched the same spot.
/// `transform` is a pure function of `(base, local, remote)` — there is
/// no tie-break side to pass in.
///
/// Returns `None` when the rebase cancels out entirely — for instance,
/// both sides deleted the same field, or remote's edit already achieved
/// what local wanted.
#[must_use]
pub fn transform(base: Option<&Value>, local: &Operation, remote: &Operation, cfg: &TextDiffConfig) -> Option<Operation> {
    use Operation::{Delete, Insert, IntegerDelta, ListDiff, ListTextDelta, ObjectDiff, Replace, TextDelta, Unknown};

    match (local, remote) {
        (Delete, Delete) => None,
        (Delete, _) => Some(Delete),
        // Remote deleted the node local meant to edit. If local's intent
        // carries a concrete final value, reinstate it as a fresh insert
        // rather than silently letting the deletion win; a delta-only
        // edit (an integer/text/structural delta) has no value to
        // reinstate and is dropped.
        (_, Delete) => match local {
            Insert(v) | Replace(v) => Some(Insert(v.clone())),
            _ => None,
        },

        (Replace(a), Replace(b)) => {
            if crate::value::equals(a, b) {
                None
            } else {
                Some(Replace(a.clone()))
            }
        }
        (Replace(v), _) => Some(Replace(v.clone())),
        (_, Replace(_)) => Some(local.clone()),

        // Both sides inserted a new value at the same key: reconcile by
        // structurally diffing remote's inserted value against local's,
        // so composite values merge field-by-field instead of one side's
        // raw value winning outright.
        (Insert(a), Insert(b)) => {
            if crate::value::equals(a, b) {
                None
            } else {
                Some(crate::diff::diff(b, a, &Policy::new(), cfg).unwrap_or_else(|| Replace(a.clone())))
            }
        }

        (IntegerDelta(a), IntegerDelta(_)) => Some(IntegerDelta(*a)),

        (TextDelta(a), TextDelta(b)) => {
            let base_text = base.and_then(Value::as_str).unwrap_or_default();
            merge_text_delta(base_text, a, b)
        }
        (ListTextDelta(a), ListTextDelta(b)) => {
            let base_text = base
                .and_then(Value::as_array)
                .map(|items| text_bridge::to_lines(items))
                .unwrap_or_default();
            merge_text_delta(&base_text, a, b).map(|op| match op {
                TextDelta(s) => ListTextDelta(s),
                other => other,
            })
        }

        (ObjectDiff(a), ObjectDiff(b)) => {
            let base_map = base.and_then(Value::as_object);
            let empty = serde_json::Map::new();
            let rebased = transform_object(base_map.unwrap_or(&empty), a, b, cfg);
            if rebased.is_empty() {
                None
            } else {
                Some(ObjectDiff(rebased))
            }
        }
        (ListDiff(a), ListDiff(b)) => {
            let base_items = base.and_then(Value::as_array);
            let empty: Vec<Value> = Vec::new();
            let rebased = transform_list(base_items.unwrap_or(&empty), a, b, cfg);
            if rebased.is_empty() {
                None
            } else {
                Some(ListDiff(rebased))
            }
        }

        (Unknown(_), _) | (_, Unknown(_)) => Some(local.clone()),

        // Mismatched structural/scalar kinds that reach here (e.g. an
        // `IntegerDelta` against a concurrent `TextDelta`) can't be
        // merged meaningfully; local's edit is kept unchanged so it is
        // never silently dropped just because remote also touched this
        // spot.
        _ => Some(local.clone()),
    }
}

/// Merges two text deltas computed against the same base text by
/// re-diffing local's resulting text against remote's resulting text,
/// rather than transforming character offsets through remote's edit.
/// This converges to the same combined content but, unlike a true
/// position-transform, does not preserve the intent of "these two edits
/// targeted disjoint regions" when both touch overlapping text.
fn merge_text_delta(base_text: &str, local_delta: &str, remote_delta: &str) -> Option<Operation> {
    let local_diffs = textdiff::from_delta(base_text, local_delta).ok()?;
    let remote_diffs = textdiff::from_delta(base_text, remote_delta).ok()?;
    let local_text = textdiff::diff_text2(&local_diffs);
    let remote_text = textdiff::diff_text2(&remote_diffs);

    if local_text == base_text {
        return None;
    }
    if local_text == remote_text {
        return None;
    }

    let mut rebase_diffs = textdiff::diff_main(&remote_text, &local_text);
    textdiff::cleanup_efficiency(&mut rebase_diffs);
    Some(Operation::TextDelta(textdiff::to_delta(&rebase_diffs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn both_delete_cancels_out() {
        assert_eq!(transform(None, &Operation::Delete, &Operation::Delete, &TextDiffConfig::default()), None);
    }

    #[test]
    fn local_delete_wins_over_remote_edit() {
        let remote = Operation::Replace(json!(2));
        let result = transform(None, &Operation::Delete, &remote, &TextDiffConfig::default());
        assert_eq!(result, Some(Operation::Delete));
    }

    #[test]
    fn remote_delete_reinstates_local_replace() {
        let local = Operation::Replace(json!("mine"));
        let result = transform(None, &local, &Operation::Delete, &TextDiffConfig::default());
        assert_eq!(result, Some(Operation::Insert(json!("mine"))));
    }

    #[test]
    fn remote_delete_drops_local_integer_delta() {
        let local = Operation::IntegerDelta(5.0);
        let result = transform(None, &local, &Operation::Delete, &TextDiffConfig::default());
        assert_eq!(result, None);
    }

    #[test]
    fn concurrent_integer_deltas_both_survive_unchanged() {
        let local = Operation::IntegerDelta(3.0);
        let remote = Operation::IntegerDelta(-1.0);
        let result = transform(None, &local, &remote, &TextDiffConfig::default());
        assert_eq!(result, Some(Operation::IntegerDelta(3.0)));
    }

    #[test]
    fn conflicting_replace_keeps_local_edit_unchanged() {
        let local = Operation::Replace(json!("a"));
        let remote = Operation::Replace(json!("b"));
        assert_eq!(transform(None, &local, &remote, &TextDiffConfig::default()), Some(Operation::Replace(json!("a"))));
    }

    #[test]
    fn identical_replace_converges_without_a_winner() {
        let op = Operation::Replace(json!("same"));
        assert_eq!(transform(None, &op, &op, &TextDiffConfig::default()), None);
    }

    #[test]
    fn conflicting_insert_merges_structurally() {
        let local = Operation::Insert(json!({"x": 1, "y": 2}));
        let remote = Operation::Insert(json!({"x": 1, "y": 9}));
        let rebased = transform(None, &local, &remote, &TextDiffConfig::default());
        assert!(matches!(rebased, Some(Operation::ObjectDiff(_))));
    }

    #[test]
    fn conflicting_insert_of_scalars_replaces() {
        let local = Operation::Insert(json!("mine"));
        let remote = Operation::Insert(json!("theirs"));
        let rebased = transform(None, &local, &remote, &TextDiffConfig::default());
        assert_eq!(rebased, Some(Operation::Replace(json!("mine"))));
    }

    #[test]
    fn identical_insert_converges_without_a_winner() {
        let op = Operation::Insert(json!("same"));
        assert_eq!(transform(None, &op, &op, &TextDiffConfig::default()), None);
    }

    #[test]
    fn text_deltas_merge_via_rediff() {
        let base = json!("hello world");
        let local_diffs = textdiff::diff_main("hello world", "hello brave world");
        let remote_diffs = textdiff::diff_main("hello world", "hello world!");
        let local = Operation::TextDelta(textdiff::to_delta(&local_diffs));
        let remote = Operation::TextDelta(textdiff::to_delta(&remote_diffs));
        let rebased = transform(Some(&base), &local, &remote, &TextDiffConfig::default());
        assert!(matches!(rebased, Some(Operation::TextDelta(_))));
    }
}
