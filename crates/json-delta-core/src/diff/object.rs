use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::op::{Delta, Operation};
use crate::policy::Policy;
use crate::textdiff::TextDiffConfig;

/// Diffs two objects field by field, recursing through `policy` for
/// per-attribute overrides.
#[must_use]
pub fn diff_objects(a: &Map<String, Value>, b: &Map<String, Value>, policy: &Policy, cfg: &TextDiffConfig) -> Delta {
    let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
    let mut delta = Delta::empty();

    for key in keys {
        let sub_policy = policy.attribute(key);
        match (a.get(key), b.get(key)) {
            (Some(_), None) => {
                delta.insert(key.clone(), Operation::Delete);
            }
            (None, Some(value)) => {
                delta.insert(key.clone(), Operation::Insert(value.clone()));
            }
            (Some(av), Some(bv)) => {
                let policy_ref = sub_policy.cloned().unwrap_or_default();
                if let Some(op) = super::diff(av, bv, &policy_ref, cfg) {
                    delta.insert(key.clone(), op);
                }
            }
            (None, None) => unreachable!("key came from the union of a's and b's keys"),
        }
    }

    delta
}
