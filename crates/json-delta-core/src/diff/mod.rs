//! Structural diff: the type-dispatched (or policy-forced) choice of
//! opcode at each node.

mod list;
mod list_dmp;
mod object;

pub use list::diff_lists;
pub use object::diff_objects;

use serde_json::Value;

use crate::op::Operation;
use crate::policy::{Otype, Policy};
use crate::textdiff::TextDiffConfig;
use crate::value;

/// Computes the operation that transforms `a` into `b` at one node,
/// honoring any `policy` override, or `None` if the values are already
/// equal.
#[must_use]
pub fn diff(a: &Value, b: &Value, policy: &Policy, cfg: &TextDiffConfig) -> Option<Operation> {
    if value::equals(a, b) {
        return None;
    }

    if let Some(otype) = policy.otype() {
        if let Some(op) = diff_with_otype(otype, a, b, policy, cfg) {
            return Some(op);
        }
    }

    Some(diff_by_type(a, b, policy, cfg))
}

fn diff_with_otype(otype: Otype, a: &Value, b: &Value, policy: &Policy, cfg: &TextDiffConfig) -> Option<Operation> {
    match otype {
        Otype::Replace => Some(Operation::Replace(b.clone())),
        Otype::List => match (a, b) {
            (Value::Array(a), Value::Array(b)) => Some(Operation::ListDiff(diff_lists(a, b, policy, cfg))),
            _ => None,
        },
        Otype::ListDmp => match (a, b) {
            (Value::Array(a), Value::Array(b)) => Some(list_dmp::diff_list_dmp(a, b)),
            _ => None,
        },
        Otype::Integer => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => Some(Operation::IntegerDelta(b - a)),
            _ => None,
        },
        Otype::String => match (a.as_str(), b.as_str()) {
            (Some(a), Some(b)) => {
                let mut diffs = crate::textdiff::diff_main(a, b);
                crate::textdiff::cleanup_efficiency(&mut diffs);
                Some(Operation::TextDelta(crate::textdiff::to_delta(&diffs)))
            }
            _ => None,
        },
    }
}

fn diff_by_type(a: &Value, b: &Value, policy: &Policy, cfg: &TextDiffConfig) -> Operation {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => Operation::ObjectDiff(diff_objects(a, b, policy, cfg)),
        // Arrays are replaced whole by default; structural list diffing is
        // opt-in via `Otype::List`/`Otype::ListDmp` in `diff_with_otype`.
        (Value::Array(_), Value::Array(_)) => Operation::Replace(b.clone()),
        (Value::String(a), Value::String(b)) => {
            let mut diffs = crate::textdiff::diff_main(a, b);
            crate::textdiff::cleanup_efficiency(&mut diffs);
            Operation::TextDelta(crate::textdiff::to_delta(&diffs))
        }
        _ => Operation::Replace(b.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_values_produce_no_operation() {
        assert!(diff(&json!({"a":1}), &json!({"a":1}), &Policy::new(), &TextDiffConfig::default()).is_none());
    }

    #[test]
    fn differing_scalars_replace() {
        let op = diff(&json!(1), &json!(2), &Policy::new(), &TextDiffConfig::default()).unwrap();
        assert_eq!(op, Operation::Replace(json!(2)));
    }

    #[test]
    fn differing_types_replace() {
        let op = diff(&json!(1), &json!("one"), &Policy::new(), &TextDiffConfig::default()).unwrap();
        assert_eq!(op, Operation::Replace(json!("one")));
    }

    #[test]
    fn objects_diff_structurally_by_default() {
        let op = diff(&json!({"a":1}), &json!({"a":2}), &Policy::new(), &TextDiffConfig::default()).unwrap();
        assert!(matches!(op, Operation::ObjectDiff(_)));
    }

    #[test]
    fn arrays_replace_whole_by_default() {
        let op = diff(&json!([1, 2, 3]), &json!([1, 2, 4]), &Policy::new(), &TextDiffConfig::default()).unwrap();
        assert_eq!(op, Operation::Replace(json!([1, 2, 4])));
    }

    #[test]
    fn strings_run_textdiff_by_default() {
        let op = diff(&json!("Ted"), &json!("Red"), &Policy::new(), &TextDiffConfig::default()).unwrap();
        assert!(matches!(op, Operation::TextDelta(_)));
    }

    #[test]
    fn policy_forces_integer_delta() {
        let policy = Policy::new().with_otype(Otype::Integer);
        let op = diff(&json!(10), &json!(7), &policy, &TextDiffConfig::default()).unwrap();
        assert_eq!(op, Operation::IntegerDelta(-3.0));
    }

    #[test]
    fn policy_forces_text_delta_on_strings() {
        let policy = Policy::new().with_otype(Otype::String);
        let op = diff(&json!("hello"), &json!("hallo"), &policy, &TextDiffConfig::default()).unwrap();
        assert!(matches!(op, Operation::TextDelta(_)));
    }

    #[test]
    fn policy_otype_mismatched_to_runtime_type_falls_back() {
        // Integer otype doesn't apply to two strings, so dispatch falls
        // back to the default type-based rule for strings: TEXTDIFF.
        let policy = Policy::new().with_otype(Otype::Integer);
        let op = diff(&json!("a"), &json!("b"), &policy, &TextDiffConfig::default()).unwrap();
        assert!(matches!(op, Operation::TextDelta(_)));
    }
}
