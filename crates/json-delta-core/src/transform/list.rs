use serde_json::Value;

use super::transform;
use crate::op::{parse_index, Delta, Operation};
use crate::textdiff::TextDiffConfig;

/// Rebases `local`'s list edits against `remote`'s, both diffed from the
/// same `base` list, shifting local's indices for remote's inserts and
/// deletes.
///
/// This is a shift-tracking transform with a contiguity shortcut: when
/// `local` and `remote` touch disjoint index ranges (the common case for
/// concurrent edits), each local index shifts by the net effect of every
/// remote edit at a lower position, and the result is exact. When the
/// two sides touch the *same* base index, the conflict is resolved
/// through the same pairwise rules [`transform`] uses for objects,
/// rather than attempting to interleave the edits positionally. Local's
/// operation always survives a conflict unchanged.
#[must_use]
pub fn transform_list(base: &[Value], local: &Delta, remote: &Delta, cfg: &TextDiffConfig) -> Delta {
    let remote_deletes: Vec<usize> = remote
        .iter()
        .filter_map(|(key, op)| matches!(op, Operation::Delete).then(|| parse_index(key)).flatten())
        .collect();
    let remote_inserts: Vec<usize> = remote
        .iter()
        .filter_map(|(key, op)| matches!(op, Operation::Insert(_)).then(|| parse_index(key)).flatten())
        .collect();

    let mut rebased = Delta::empty();

    for (key, local_op) in local.iter() {
        let Some(index) = parse_index(key) else { continue };

        match local_op {
            Operation::Insert(value) => {
                let shift = remote_inserts.iter().filter(|&&i| i <= index).count() as isize
                    - remote_deletes.iter().filter(|&&d| d < index).count() as isize;
                let target = (index as isize + shift).max(0) as usize;
                rebased.insert(target.to_string(), Operation::Insert(value.clone()));
            }
            _ => {
                if let Some(remote_op) = remote.get(key) {
                    if let Some(op) = transform(base.get(index), local_op, remote_op, cfg) {
                        let shifted = shift_surviving_index(index, &remote_deletes, &remote_inserts);
                        if let Some(shifted) = shifted {
                            rebased.insert(shifted.to_string(), op);
                        }
                    }
                } else if !remote_deletes.contains(&index) {
                    if let Some(shifted) = shift_surviving_index(index, &remote_deletes, &remote_inserts) {
                        rebased.insert(shifted.to_string(), local_op.clone());
                    }
                }
            }
        }
    }

    rebased
}

fn shift_surviving_index(index: usize, remote_deletes: &[usize], remote_inserts: &[usize]) -> Option<usize> {
    if remote_deletes.contains(&index) {
        return None;
    }
    let deletes_before = remote_deletes.iter().filter(|&&d| d < index).count();
    let inserts_before = remote_inserts.iter().filter(|&&i| i <= index).count();
    Some(index + inserts_before - deletes_before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_edit_shifts_past_remote_deletion() {
        let base = vec![json!("a"), json!("b"), json!("c")];
        let local = Delta::from_entries([("2".to_owned(), Operation::Replace(json!("C")))]);
        let remote = Delta::from_entries([("0".to_owned(), Operation::Delete)]);
        let rebased = transform_list(&base, &local, &remote, &TextDiffConfig::default());
        assert_eq!(rebased.get("1"), Some(&Operation::Replace(json!("C"))));
    }

    #[test]
    fn local_edit_shifts_past_remote_insertion() {
        let base = vec![json!("a"), json!("b")];
        let local = Delta::from_entries([("1".to_owned(), Operation::Replace(json!("B")))]);
        let remote = Delta::from_entries([("0".to_owned(), Operation::Insert(json!("new")))]);
        let rebased = transform_list(&base, &local, &remote, &TextDiffConfig::default());
        assert_eq!(rebased.get("2"), Some(&Operation::Replace(json!("B"))));
    }

    #[test]
    fn same_index_conflict_keeps_local_edit_unchanged() {
        let base = vec![json!("a")];
        let local = Delta::from_entries([("0".to_owned(), Operation::Replace(json!("mine")))]);
        let remote = Delta::from_entries([("0".to_owned(), Operation::Replace(json!("theirs")))]);
        let rebased = transform_list(&base, &local, &remote, &TextDiffConfig::default());
        assert_eq!(rebased.get("0"), Some(&Operation::Replace(json!("mine"))));
    }

    #[test]
    fn edit_on_a_remotely_deleted_item_is_dropped() {
        let base = vec![json!("a")];
        let local = Delta::from_entries([("0".to_owned(), Operation::IntegerDelta(1.0))]);
        let remote = Delta::from_entries([("0".to_owned(), Operation::Delete)]);
        let rebased = transform_list(&base, &local, &remote, &TextDiffConfig::default());
        assert!(rebased.get("0").is_none());
    }
}
