use serde_json::Value;

use crate::op::{Delta, Operation};
use crate::policy::Policy;
use crate::textdiff::TextDiffConfig;
use crate::value;

/// Diffs two lists positionally: trims the common prefix and suffix,
/// recurses through the overlapping middle, and expresses any remaining
/// length difference as deletes (keyed by their index in `a`) or inserts
/// (keyed by their target index in `b`).
///
/// This is a non-minimal-edit diff — it does not search for a longest
/// common subsequence or detect moved elements, trading optimality for a
/// patch/transform story simple enough to invert and compose.
#[must_use]
pub fn diff_lists(a: &[Value], b: &[Value], policy: &Policy, cfg: &TextDiffConfig) -> Delta {
    let mut prefix = 0usize;
    while prefix < a.len() && prefix < b.len() && value::equals(&a[prefix], &b[prefix]) {
        prefix += 1;
    }

    let mut suffix = 0usize;
    while suffix < a.len() - prefix
        && suffix < b.len() - prefix
        && value::equals(&a[a.len() - 1 - suffix], &b[b.len() - 1 - suffix])
    {
        suffix += 1;
    }

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];
    let overlap = mid_a.len().min(mid_b.len());
    let item_policy = policy.item().cloned().unwrap_or_default();

    let mut delta = Delta::empty();

    for i in 0..overlap {
        if let Some(op) = super::diff(&mid_a[i], &mid_b[i], &item_policy, cfg) {
            delta.insert((prefix + i).to_string(), op);
        }
    }

    for (offset, _) in mid_a.iter().enumerate().skip(overlap) {
        delta.insert((prefix + offset).to_string(), Operation::Delete);
    }

    for (offset, value) in mid_b.iter().enumerate().skip(overlap) {
        delta.insert((prefix + offset).to_string(), Operation::Insert(value.clone()));
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::numeric_entries;
    use serde_json::json;

    #[test]
    fn identical_lists_produce_no_changes() {
        let a = [json!(1), json!(2)];
        let b = [json!(1), json!(2)];
        assert!(diff_lists(&a, &b, &Policy::new(), &TextDiffConfig::default()).is_empty());
    }

    #[test]
    fn appended_element_is_a_single_insert() {
        let a = [json!(1), json!(2)];
        let b = [json!(1), json!(2), json!(3)];
        let delta = diff_lists(&a, &b, &Policy::new(), &TextDiffConfig::default());
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get("2"), Some(&Operation::Insert(json!(3))));
    }

    #[test]
    fn removed_middle_element_is_keyed_by_its_original_index() {
        let a = [json!(1), json!(2), json!(3)];
        let b = [json!(1), json!(3)];
        let delta = diff_lists(&a, &b, &Policy::new(), &TextDiffConfig::default());
        assert_eq!(delta.get("1"), Some(&Operation::Delete));
    }

    #[test]
    fn changed_element_recurses_at_shared_prefix_offset() {
        let a = [json!({"x": 1}), json!(2)];
        let b = [json!({"x": 2}), json!(2)];
        let delta = diff_lists(&a, &b, &Policy::new(), &TextDiffConfig::default());
        let (index, op) = numeric_entries(&delta)[0];
        assert_eq!(index, 0);
        assert!(matches!(op, Operation::ObjectDiff(_)));
    }
}
