//! Remapping caret offsets through a text edit.
//!
//! A collaborative editor typically needs more than "here is the new
//! text" — it needs to know where the user's cursor should land after
//! someone else's edit lands underneath it. This module answers that
//! question two ways: [`apply_diff_with_offsets`] remaps offsets through
//! a single already-known `Operation` (cheap, exact, no relocation
//! needed since the pre-image is trusted); [`patch_apply_with_offsets`]
//! fuzzily relocates a *sequence* of context-bearing [`Patch`]es against
//! text that may have drifted since the patches were built — the same
//! tolerance [`textdiff::patch_apply`] gives the plain `d`/`dL` path,
//! with offsets threaded through the relocation instead of discarded.

use serde_json::{Map, Value};

use crate::error::DeltaError;
use crate::op::{Delta, Operation};
use crate::patch::{apply_diff, patch_object};
use crate::textdiff::{self, Patch, TextDiffConfig};

/// Applies `op` to `value`, additionally remapping each offset in
/// `offsets` (character positions into `value`, when it's a string or a
/// newline-joined list) to its corresponding position in the patched
/// result.
///
/// # Errors
///
/// Same conditions as [`apply_diff`].
pub fn apply_diff_with_offsets(
    value: &Value,
    op: &Operation,
    offsets: &[usize],
    cfg: &TextDiffConfig,
) -> Result<(Value, Vec<usize>), DeltaError> {
    match op {
        Operation::TextDelta(delta) => {
            let text = value.as_str().ok_or_else(|| DeltaError::OpcodeTypeMismatch {
                op: "d",
                found: crate::value::type_of(value),
            })?;
            let diffs = textdiff::from_delta(text, delta)?;
            let patched = textdiff::diff_text2(&diffs);
            let remapped = remap_offsets(&diffs, offsets);
            Ok((Value::String(patched), remapped))
        }
        Operation::ListTextDelta(delta) => {
            let items = value.as_array().ok_or_else(|| DeltaError::OpcodeTypeMismatch {
                op: "dL",
                found: crate::value::type_of(value),
            })?;
            let text1 = crate::text_bridge::to_lines(items);
            let diffs = textdiff::from_delta(&text1, delta)?;
            let patched_text = textdiff::diff_text2(&diffs);
            let patched_items = crate::text_bridge::from_lines(&patched_text)?;
            let remapped = remap_offsets(&diffs, offsets);
            Ok((Value::Array(patched_items), remapped))
        }
        _ => apply_diff(value, op, cfg).map(|patched| (patched, offsets.to_vec())),
    }
}

/// Maps each offset in `text1`'s coordinate space to its corresponding
/// offset in `text2`'s, per the diff that transforms one into the other.
#[must_use]
pub fn remap_offsets(diffs: &[textdiff::DiffRecord], offsets: &[usize]) -> Vec<usize> {
    offsets.iter().map(|&offset| textdiff::diff_x_index(diffs, offset)).collect()
}

/// Applies a sequence of context-bearing `patches` (as built by
/// [`textdiff::patch_make`]) to `text`, fuzzily relocating any patch
/// whose surrounding context has drifted, and remaps `offsets` (caret
/// positions into `text`) through the relocated edits in place.
///
/// This is the same padding/split/fuzzy-match/drift-tracking pipeline
/// [`textdiff::patch_apply`] uses; the difference is that every offset
/// is carried through each patch's relocation instead of being
/// discarded, so a caller tracking a live cursor can ask "where does my
/// caret land" across a whole batch of possibly-drifted edits rather
/// than just one clean one.
#[must_use]
pub fn patch_apply_with_offsets(text: &str, patches: &[Patch], offsets: &mut [usize], cfg: &TextDiffConfig) -> String {
    if patches.is_empty() {
        return text.to_owned();
    }

    let patches = textdiff::patch_deep_copy(patches);
    let mut buffer: Vec<char> = text.chars().collect();
    let padding = textdiff::patch_add_padding(&mut buffer, cfg);
    let padding_len = padding.chars().count();
    let patches = textdiff::patch_split_max(patches, cfg);

    for offset in offsets.iter_mut() {
        *offset += padding_len;
    }

    let mut delta: i64 = 0;

    for patch in &patches {
        let expected_loc = (patch.start2 as i64 + delta).max(0) as usize;
        let text1 = textdiff::diff_text1(&patch.diffs);
        let text1_chars: Vec<char> = text1.chars().collect();

        let Some((start_loc, matched_text)) = textdiff::locate_patch(&buffer, &text1_chars, expected_loc, cfg) else {
            delta -= patch.length2 as i64 - patch.length1 as i64;
            continue;
        };

        let local_diffs = textdiff::diff_main(&text1, &matched_text);
        let oversized = text1_chars.len() > cfg.match_max_bits as usize;
        if oversized && !text1_chars.is_empty() {
            let ratio = textdiff::levenshtein(&local_diffs) as f64 / text1_chars.len() as f64;
            if ratio > cfg.patch_delete_threshold {
                delta -= patch.length2 as i64 - patch.length1 as i64;
                continue;
            }
        }

        let window_len = text1_chars.len();
        let window_end = start_loc + window_len;
        let shift = textdiff::diff_text2(&local_diffs).chars().count() as i64 - window_len as i64;

        for offset in offsets.iter_mut() {
            if *offset < start_loc {
                continue;
            } else if *offset <= window_end {
                let relative = *offset - start_loc;
                *offset = start_loc + textdiff::diff_x_index(&local_diffs, relative);
            } else {
                *offset = (*offset as i64 + shift).max(0) as usize;
            }
        }

        textdiff::apply_local_diffs(&mut buffer, start_loc, &local_diffs);
        delta = start_loc as i64 - patch.start2 as i64;
    }

    let end = buffer.len().saturating_sub(padding_len);
    let body_start = padding_len.min(end);
    let body_len = end.saturating_sub(body_start);
    for offset in offsets.iter_mut() {
        *offset = offset.saturating_sub(padding_len).min(body_len);
    }

    buffer.get(body_start..end).unwrap_or(&[]).iter().collect()
}

/// Applies an object-level delta to `s`, but routes `field`'s `d`
/// (text) operation through [`patch_apply_with_offsets`] instead of the
/// plain `d` path [`patch_object`] would otherwise use, so caller-tracked
/// `offsets` into that field's text survive the edit. Every other field
/// is patched normally.
///
/// # Errors
///
/// Returns [`DeltaError::OpcodeTypeMismatch`] if `field`'s operation is a
/// `d` opcode but `s[field]` isn't a string, or any error
/// [`patch_object`] would raise applying the remaining fields.
pub fn apply_object_diff_with_offsets(
    s: &Map<String, Value>,
    diffs: &Delta,
    field: &str,
    offsets: &mut [usize],
    cfg: &TextDiffConfig,
) -> Result<Map<String, Value>, DeltaError> {
    let mut remaining = diffs.clone();
    let field_op = remaining.remove(field);

    let mut patched = patch_object(s, &remaining, cfg)?;

    match field_op {
        Some(Operation::TextDelta(delta)) => {
            let text = s.get(field).and_then(Value::as_str).ok_or_else(|| DeltaError::OpcodeTypeMismatch {
                op: "d",
                found: crate::value::type_of(s.get(field).unwrap_or(&Value::Null)),
            })?;
            let diffs = textdiff::from_delta(text, &delta)?;
            let patches = textdiff::patch_make(text, &diffs, cfg);
            let patched_text = patch_apply_with_offsets(text, &patches, offsets, cfg);
            patched.insert(field.to_owned(), Value::String(patched_text));
        }
        Some(other) => {
            let current = s.get(field).cloned().unwrap_or(Value::Null);
            patched.insert(field.to_owned(), apply_diff(&current, &other, cfg)?);
        }
        None => {}
    }

    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offset_after_an_earlier_insertion_shifts_forward() {
        let text1 = "hello world";
        let text2 = "hello brave world";
        let diffs = textdiff::diff_main(text1, text2);
        let delta = textdiff::to_delta(&diffs);
        let (patched, offsets) =
            apply_diff_with_offsets(&json!(text1), &Operation::TextDelta(delta), &[6, 11], &TextDiffConfig::default())
                .unwrap();
        assert_eq!(patched, json!(text2));
        // offset 6 sits at the insertion point, so it lands after the
        // inserted text rather than before it; offset 11 (end of text1)
        // shifts by the inserted run's length.
        assert_eq!(offsets, vec![12, 17]);
    }

    #[test]
    fn non_text_opcode_passes_offsets_through() {
        let (patched, offsets) =
            apply_diff_with_offsets(&json!(1), &Operation::IntegerDelta(2.0), &[0, 5], &TextDiffConfig::default())
                .unwrap();
        assert_eq!(patched, json!(3.0));
        assert_eq!(offsets, vec![0, 5]);
    }

    #[test]
    fn patch_apply_with_offsets_tracks_caret_through_clean_application() {
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "The quick red fox leaps over the lazy dog.";
        let diffs = textdiff::diff_main(text1, text2);
        let cfg = TextDiffConfig::default();
        let patches = textdiff::patch_make(text1, &diffs, &cfg);

        // A caret sitting right after "fox " (start of "jumps") should
        // land right after "fox " in the patched text (start of "leaps").
        let mut offsets = vec![text1.find("jumps").unwrap()];
        let applied = patch_apply_with_offsets(text1, &patches, &mut offsets, &cfg);
        assert_eq!(applied, text2);
        assert_eq!(&applied[offsets[0]..], "leaps over the lazy dog.");
    }

    #[test]
    fn patch_apply_with_offsets_tolerates_shifted_context() {
        let text1 = "alpha beta gamma delta epsilon";
        let text2 = "alpha beta GAMMA delta epsilon";
        let cfg = TextDiffConfig::default();
        let diffs = textdiff::diff_main(text1, text2);
        let patches = textdiff::patch_make(text1, &diffs, &cfg);

        let prefix = "prefix-- ";
        let drifted = format!("{prefix}{text1}");
        let mut offsets = vec![drifted.find("delta").unwrap()];
        let applied = patch_apply_with_offsets(&drifted, &patches, &mut offsets, &cfg);
        assert!(applied.contains("GAMMA"));
        assert_eq!(&applied[offsets[0]..offsets[0] + 5], "delta");
    }

    #[test]
    fn apply_object_diff_with_offsets_relocates_named_field_text_and_patches_rest() {
        let s = json!({"body": "hello world", "count": 1}).as_object().unwrap().clone();
        let cfg = TextDiffConfig::default();

        let body_diffs = textdiff::diff_main("hello world", "hello brave world");
        let delta = Delta::from_entries([
            ("body".to_owned(), Operation::TextDelta(textdiff::to_delta(&body_diffs))),
            ("count".to_owned(), Operation::IntegerDelta(1.0)),
        ]);

        let mut offsets = vec![6];
        let patched = apply_object_diff_with_offsets(&s, &delta, "body", &mut offsets, &cfg).unwrap();
        assert_eq!(patched.get("body"), Some(&json!("hello brave world")));
        assert_eq!(patched.get("count"), Some(&json!(2.0)));
        assert_eq!(offsets, vec![12]);
    }

    #[test]
    fn apply_object_diff_with_offsets_rejects_text_delta_against_non_string_field() {
        let s = json!({"body": 5}).as_object().unwrap().clone();
        let cfg = TextDiffConfig::default();
        let delta = Delta::from_entries([("body".to_owned(), Operation::TextDelta(String::new()))]);
        let err = apply_object_diff_with_offsets(&s, &delta, "body", &mut [], &cfg).unwrap_err();
        assert!(matches!(err, DeltaError::OpcodeTypeMismatch { op: "d", .. }));
    }
}
