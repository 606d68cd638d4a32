use serde_json::{Map, Value};

use super::transform;
use crate::op::Delta;
use crate::textdiff::TextDiffConfig;

/// Rebases `local`'s per-field edits against `remote`'s, both diffed
/// from the same `base` object.
///
/// Fields only `local` touched pass through unchanged; fields only
/// `remote` touched don't appear in the result (there is nothing left
/// for `local` to contribute there); fields both touched are resolved
/// per the pairwise rules in [`transform`], which always keeps local's
/// edit unless a merge applies.
#[must_use]
pub fn transform_object(base: &Map<String, Value>, local: &Delta, remote: &Delta, cfg: &TextDiffConfig) -> Delta {
    let mut rebased = Delta::empty();

    for (key, local_op) in local.iter() {
        match remote.get(key) {
            None => {
                rebased.insert(key.clone(), local_op.clone());
            }
            Some(remote_op) => {
                if let Some(op) = transform(base.get(key), local_op, remote_op, cfg) {
                    rebased.insert(key.clone(), op);
                }
            }
        }
    }

    rebased
}
