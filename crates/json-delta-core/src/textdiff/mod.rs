//! Character- and line-level text diffing, delta encoding, and fuzzy
//! patch application.
//!
//! This module treats text diffing as a self-contained collaborator with
//! its own wire format (a compact delta string) and its own patch/match
//! machinery, independent of the structural JSON delta model the rest of
//! the crate implements. [`similar`] supplies the underlying Myers diff;
//! delta encoding, patch construction, and fuzzy matching are built on
//! top of it here since no single published crate in this dependency
//! stack covers all four together.

mod delta_codec;
mod match_;
mod patch;

pub use delta_codec::{from_delta, to_delta};
pub use match_::match_main;
pub use patch::{patch_add_padding, patch_apply, patch_deep_copy, patch_make, patch_split_max, Patch};
pub(crate) use patch::{apply_local_diffs, locate_patch};

use similar::{ChangeTag, TextDiff};

/// A single run of a character- or line-level text diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffRecord {
    /// Unchanged text common to both inputs.
    Equal(String),
    /// Text present only in the second input.
    Insert(String),
    /// Text present only in the first input.
    Delete(String),
}

impl DiffRecord {
    fn text(&self) -> &str {
        match self {
            Self::Equal(s) | Self::Insert(s) | Self::Delete(s) => s,
        }
    }
}

/// Tunable configuration for text diffing, delta encoding, and patch
/// application.
///
/// Held by the caller and passed explicitly rather than kept as
/// process-wide mutable state, so that concurrent callers with different
/// tuning never need to coordinate over a shared instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextDiffConfig {
    /// Upper bound on pattern length the fuzzy matcher can search for in
    /// one pass (`Match_MaxBits`). Patches whose pre-image text exceeds
    /// this are located via a start/end anchor pair instead.
    pub match_max_bits: u32,
    /// Levenshtein/length ratio above which a patch's matched region is
    /// considered content-mismatched and the patch is discarded
    /// (`Patch_DeleteThreshold`).
    pub patch_delete_threshold: f64,
    /// Score threshold (lower is stricter) a fuzzy match location must
    /// meet to be accepted (`Match_Threshold`).
    pub match_threshold: f64,
    /// How far (in characters) the fuzzy matcher will search from the
    /// expected location before giving up (`Match_Distance`).
    pub match_distance: u32,
    /// Characters of context kept on each side of an edit when building
    /// a patch (`Patch_Margin`).
    pub patch_margin: u32,
}

impl Default for TextDiffConfig {
    fn default() -> Self {
        Self {
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            match_threshold: 0.5,
            match_distance: 1000,
            patch_margin: 4,
        }
    }
}

/// Computes a character-level diff (`diff_main`).
#[must_use]
pub fn diff_main(text1: &str, text2: &str) -> Vec<DiffRecord> {
    let diff = TextDiff::from_chars(text1, text2);
    coalesce(diff.iter_all_changes().map(|change| (change.tag(), change.value().to_owned())))
}

/// Computes a line-level diff (`diff_lineMode_`), used by `list_diff_dmp`
/// over the newline-joined serialization of a list.
#[must_use]
pub fn diff_line_mode(text1: &str, text2: &str) -> Vec<DiffRecord> {
    let diff = TextDiff::from_lines(text1, text2);
    coalesce(diff.iter_all_changes().map(|change| (change.tag(), change.value().to_owned())))
}

fn coalesce(changes: impl Iterator<Item = (ChangeTag, String)>) -> Vec<DiffRecord> {
    let mut out: Vec<DiffRecord> = Vec::new();
    for (tag, text) in changes {
        match (tag, out.last_mut()) {
            (ChangeTag::Equal, Some(DiffRecord::Equal(buf))) => buf.push_str(&text),
            (ChangeTag::Delete, Some(DiffRecord::Delete(buf))) => buf.push_str(&text),
            (ChangeTag::Insert, Some(DiffRecord::Insert(buf))) => buf.push_str(&text),
            (ChangeTag::Equal, _) => out.push(DiffRecord::Equal(text)),
            (ChangeTag::Delete, _) => out.push(DiffRecord::Delete(text)),
            (ChangeTag::Insert, _) => out.push(DiffRecord::Insert(text)),
        }
    }
    out
}

/// Merges short equalities sandwiched between edits so the diff favors
/// fewer, larger edits (`diff_cleanupEfficiency`).
///
/// This is a linear-scan simplification of the upstream cleanup pass
/// (which additionally weighs an "edit cost" against the byte savings of
/// merging); it still strictly preserves both the pre- and post-image
/// text, since splitting an equality into a delete/insert pair of the
/// same text never changes what either side reconstructs to.
pub fn cleanup_efficiency(diffs: &mut Vec<DiffRecord>) {
    const SHORT_EQUALITY: usize = 4;

    let mut index = 0;
    while index < diffs.len() {
        let should_split = matches!(&diffs[index], DiffRecord::Equal(text) if {
            let len = text.chars().count();
            let has_prev_edit = index > 0 && !matches!(diffs[index - 1], DiffRecord::Equal(_));
            let has_next_edit =
                index + 1 < diffs.len() && !matches!(diffs[index + 1], DiffRecord::Equal(_));
            len > 0 && len <= SHORT_EQUALITY && has_prev_edit && has_next_edit
        });
        if should_split {
            let text = diffs[index].text().to_owned();
            diffs.splice(index..=index, [DiffRecord::Delete(text.clone()), DiffRecord::Insert(text)]);
            continue;
        }
        index += 1;
    }
    merge_adjacent(diffs);
}

fn merge_adjacent(diffs: &mut Vec<DiffRecord>) {
    let mut merged: Vec<DiffRecord> = Vec::with_capacity(diffs.len());
    for record in diffs.drain(..) {
        let same_tag = matches!(
            (merged.last(), &record),
            (Some(DiffRecord::Equal(_)), DiffRecord::Equal(_))
                | (Some(DiffRecord::Delete(_)), DiffRecord::Delete(_))
                | (Some(DiffRecord::Insert(_)), DiffRecord::Insert(_))
        );
        if same_tag {
            let buf = match merged.last_mut().expect("same_tag implies a previous record") {
                DiffRecord::Equal(buf) | DiffRecord::Delete(buf) | DiffRecord::Insert(buf) => buf,
            };
            buf.push_str(record.text());
        } else {
            merged.push(record);
        }
    }
    *diffs = merged;
}

/// Reconstructs the pre-image (`text1`) from a diff record sequence
/// (`diff_text1`): the concatenation of `Equal` and `Delete` runs.
#[must_use]
pub fn diff_text1(diffs: &[DiffRecord]) -> String {
    let mut out = String::new();
    for record in diffs {
        match record {
            DiffRecord::Equal(text) | DiffRecord::Delete(text) => out.push_str(text),
            DiffRecord::Insert(_) => {}
        }
    }
    out
}

/// Reconstructs the post-image (`text2`) from a diff record sequence:
/// the concatenation of `Equal` and `Insert` runs.
#[must_use]
pub fn diff_text2(diffs: &[DiffRecord]) -> String {
    let mut out = String::new();
    for record in diffs {
        match record {
            DiffRecord::Equal(text) | DiffRecord::Insert(text) => out.push_str(text),
            DiffRecord::Delete(_) => {}
        }
    }
    out
}

/// Maps a character offset in `text1` to the corresponding offset in
/// `text2` (`diff_xIndex`).
#[must_use]
pub fn diff_x_index(diffs: &[DiffRecord], loc1: usize) -> usize {
    let mut chars1 = 0usize;
    let mut chars2 = 0usize;
    let mut last_chars1 = 0usize;
    let mut last_chars2 = 0usize;
    let mut overshoot_was_delete = false;
    let mut broke_early = false;

    for record in diffs {
        let len = record.text().chars().count();
        match record {
            DiffRecord::Equal(_) => {
                chars1 += len;
                chars2 += len;
                overshoot_was_delete = false;
            }
            DiffRecord::Delete(_) => {
                chars1 += len;
                overshoot_was_delete = true;
            }
            DiffRecord::Insert(_) => {
                chars2 += len;
                overshoot_was_delete = false;
            }
        }
        if chars1 > loc1 {
            broke_early = true;
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    if broke_early && overshoot_was_delete {
        return last_chars2;
    }
    last_chars2 + loc1.saturating_sub(last_chars1)
}

/// Counts the number of single-character edits implied by a diff
/// (`diff_levenshtein`).
#[must_use]
pub fn levenshtein(diffs: &[DiffRecord]) -> usize {
    let mut total = 0usize;
    let mut insertions = 0usize;
    let mut deletions = 0usize;
    for record in diffs {
        match record {
            DiffRecord::Insert(text) => insertions += text.chars().count(),
            DiffRecord::Delete(text) => deletions += text.chars().count(),
            DiffRecord::Equal(_) => {
                total += insertions.max(deletions);
                insertions = 0;
                deletions = 0;
            }
        }
    }
    total + insertions.max(deletions)
}
