//! Patch construction and fuzzy application (`patch_make` / `patch_apply`).

use super::{diff_main, diff_text1, levenshtein, match_main, DiffRecord, TextDiffConfig};

/// A single located edit, with enough surrounding context to be
/// relocated by fuzzy match if the surrounding text has since shifted.
#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    /// The diff records this patch applies, including margin context.
    pub diffs: Vec<DiffRecord>,
    /// Expected start offset in the pre-image text.
    pub start1: usize,
    /// Expected start offset in the post-image text.
    pub start2: usize,
    /// Length of the affected span in the pre-image text.
    pub length1: usize,
    /// Length of the affected span in the post-image text.
    pub length2: usize,
}

impl Patch {
    fn new() -> Self {
        Self { diffs: Vec::new(), start1: 0, start2: 0, length1: 0, length2: 0 }
    }
}

fn record_len(record: &DiffRecord) -> usize {
    match record {
        DiffRecord::Equal(s) | DiffRecord::Delete(s) | DiffRecord::Insert(s) => s.chars().count(),
    }
}

/// Builds a sequence of context-bearing patches from a diff against its
/// pre-image text.
#[must_use]
pub fn patch_make(text1: &str, diffs: &[DiffRecord], cfg: &TextDiffConfig) -> Vec<Patch> {
    if diffs.is_empty() {
        return Vec::new();
    }
    let margin = cfg.patch_margin as usize;

    let mut patches = Vec::new();
    let mut patch = Patch::new();
    let mut char_count1 = 0usize;
    let mut char_count2 = 0usize;
    let mut prepatch: Vec<char> = text1.chars().collect();
    let mut postpatch: Vec<char> = prepatch.clone();

    for diff in diffs {
        if patch.diffs.is_empty() && !matches!(diff, DiffRecord::Equal(_)) {
            patch.start1 = char_count1;
            patch.start2 = char_count2;
        }

        match diff {
            DiffRecord::Insert(text) => {
                let chars: Vec<char> = text.chars().collect();
                patch.length2 += chars.len();
                postpatch.splice(char_count2..char_count2, chars);
                patch.diffs.push(diff.clone());
            }
            DiffRecord::Delete(text) => {
                let n = text.chars().count();
                patch.length1 += n;
                postpatch.splice(char_count2..(char_count2 + n).min(postpatch.len()), std::iter::empty());
                patch.diffs.push(diff.clone());
            }
            DiffRecord::Equal(text) => {
                let n = text.chars().count();
                if n <= 2 * margin && !patch.diffs.is_empty() {
                    patch.length1 += n;
                    patch.length2 += n;
                    patch.diffs.push(diff.clone());
                } else if n >= 2 * margin && !patch.diffs.is_empty() {
                    add_context(&mut patch, &prepatch, margin);
                    patches.push(std::mem::replace(&mut patch, Patch::new()));
                    prepatch = postpatch.clone();
                }
            }
        }

        if !matches!(diff, DiffRecord::Insert(_)) {
            char_count1 += record_len(diff);
        }
        if !matches!(diff, DiffRecord::Delete(_)) {
            char_count2 += record_len(diff);
        }
    }

    if !patch.diffs.is_empty() {
        add_context(&mut patch, &prepatch, margin);
        patches.push(patch);
    }
    patches
}

fn add_context(patch: &mut Patch, text: &[char], margin: usize) {
    if text.is_empty() {
        return;
    }
    let prefix_start = patch.start2.saturating_sub(margin);
    let prefix_end = patch.start2.min(text.len());
    let prefix: Vec<char> = text.get(prefix_start..prefix_end).map_or_else(Vec::new, <[char]>::to_vec);
    if !prefix.is_empty() {
        patch.diffs.insert(0, DiffRecord::Equal(prefix.iter().collect()));
    }

    let suffix_start = (patch.start2 + patch.length1).min(text.len());
    let suffix_end = (patch.start2 + patch.length1 + margin).min(text.len());
    let suffix: Vec<char> = text.get(suffix_start..suffix_end).map_or_else(Vec::new, <[char]>::to_vec);
    if !suffix.is_empty() {
        patch.diffs.push(DiffRecord::Equal(suffix.iter().collect()));
    }

    patch.start1 = patch.start1.saturating_sub(prefix.len());
    patch.start2 = patch.start2.saturating_sub(prefix.len());
    patch.length1 += prefix.len() + suffix.len();
    patch.length2 += prefix.len() + suffix.len();
}

/// Deep-copies a patch list; patches never alias the diff text they hold.
#[must_use]
pub fn patch_deep_copy(patches: &[Patch]) -> Vec<Patch> {
    patches.to_vec()
}

/// Pads `text` with a sentinel run of NUL characters on both ends so
/// that edits at the very start or end of the text still have room for
/// margin context, returning the padding string used.
pub fn patch_add_padding(text: &mut Vec<char>, cfg: &TextDiffConfig) -> String {
    let padding = "\0".repeat(cfg.patch_margin as usize);
    let padding_chars: Vec<char> = padding.chars().collect();
    text.splice(0..0, padding_chars.clone());
    text.extend(padding_chars);
    padding
}

/// Splits patches whose pre-image text exceeds
/// [`TextDiffConfig::match_max_bits`] into anchor-sized windows so the
/// fuzzy matcher can locate each half independently.
#[must_use]
pub fn patch_split_max(patches: Vec<Patch>, cfg: &TextDiffConfig) -> Vec<Patch> {
    let max_bits = cfg.match_max_bits as usize;
    if max_bits == 0 {
        return patches;
    }
    let margin = cfg.patch_margin as usize;
    let mut out = Vec::with_capacity(patches.len());

    for patch in patches {
        if patch.length1 <= max_bits {
            out.push(patch);
            continue;
        }

        let chunk = max_bits - margin.min(max_bits.saturating_sub(1)).max(1);
        let mut start1 = patch.start1;
        let mut start2 = patch.start2;
        let mut remaining = patch.diffs;

        while !remaining.is_empty() {
            let mut window = Vec::new();
            let mut taken1 = 0usize;
            let mut taken2 = 0usize;
            while !remaining.is_empty() && taken1 < chunk {
                let record = remaining.remove(0);
                let len = record_len(&record);
                if !matches!(record, DiffRecord::Insert(_)) {
                    taken1 += len;
                }
                if !matches!(record, DiffRecord::Delete(_)) {
                    taken2 += len;
                }
                window.push(record);
            }
            if window.is_empty() {
                break;
            }
            let length1 = window.iter().filter(|r| !matches!(r, DiffRecord::Insert(_))).map(record_len).sum();
            let length2 = window.iter().filter(|r| !matches!(r, DiffRecord::Delete(_))).map(record_len).sum();
            out.push(Patch { diffs: window, start1, start2, length1, length2 });
            start1 += taken1;
            start2 += taken2;
        }
    }
    out
}

/// Applies `patches` to `text`, fuzzily relocating each one if the
/// surrounding text has drifted, and reports which patches applied
/// cleanly.
#[must_use]
pub fn patch_apply(patches: &[Patch], text: &str, cfg: &TextDiffConfig) -> (String, Vec<bool>) {
    if patches.is_empty() {
        return (text.to_owned(), Vec::new());
    }

    let patches = patch_deep_copy(patches);
    let mut buffer: Vec<char> = text.chars().collect();
    let padding = patch_add_padding(&mut buffer, cfg);
    let padding_len = padding.chars().count();
    let patches = patch_split_max(patches, cfg);

    let mut delta: i64 = 0;
    let mut results = Vec::with_capacity(patches.len());

    for patch in &patches {
        let expected_loc = (patch.start2 as i64 + delta).max(0) as usize;
        let text1 = diff_text1(&patch.diffs);
        let text1_chars: Vec<char> = text1.chars().collect();

        let located = locate_patch(&buffer, &text1_chars, expected_loc, cfg);

        let Some((start_loc, matched_text)) = located else {
            results.push(false);
            delta -= patch.length2 as i64 - patch.length1 as i64;
            continue;
        };

        let local_diffs = diff_main(&text1, &matched_text);
        let oversized = text1_chars.len() > cfg.match_max_bits as usize;
        if oversized && !text1_chars.is_empty() {
            let ratio = levenshtein(&local_diffs) as f64 / text1_chars.len() as f64;
            if ratio > cfg.patch_delete_threshold {
                results.push(false);
                delta -= patch.length2 as i64 - patch.length1 as i64;
                continue;
            }
        }

        apply_local_diffs(&mut buffer, start_loc, &local_diffs);
        results.push(true);
        delta = start_loc as i64 - patch.start2 as i64;
    }

    let end = buffer.len().saturating_sub(padding_len);
    let body: String = buffer.get(padding_len.min(end)..end).unwrap_or(&[]).iter().collect();
    (body, results)
}

/// Fuzzily locates `text1` in `buffer` near `expected_loc`, falling back
/// to a start/end anchor pair when `text1` exceeds
/// [`TextDiffConfig::match_max_bits`]. Shared by [`patch_apply`] and the
/// offset-tracking variant in `offsets.rs`.
pub(crate) fn locate_patch(
    buffer: &[char],
    text1: &[char],
    expected_loc: usize,
    cfg: &TextDiffConfig,
) -> Option<(usize, String)> {
    let max_bits = cfg.match_max_bits as usize;
    if max_bits == 0 || text1.len() <= max_bits {
        let start = match_main(buffer, text1, expected_loc, cfg)?;
        let end = (start + text1.len()).min(buffer.len());
        return Some((start, buffer[start..end].iter().collect()));
    }

    let head = &text1[..max_bits];
    let tail_start = text1.len() - max_bits;
    let tail = &text1[tail_start..];

    let start = match_main(buffer, head, expected_loc, cfg)?;
    let end = match_main(buffer, tail, expected_loc + tail_start, cfg)?;
    if end < start {
        return None;
    }
    let window_end = (end + max_bits).min(buffer.len());
    Some((start, buffer[start..window_end].iter().collect()))
}

/// Splices a located patch's diff records into `buffer` starting at
/// `start_loc`. Shared by [`patch_apply`] and the offset-tracking variant
/// in `offsets.rs`.
pub(crate) fn apply_local_diffs(buffer: &mut Vec<char>, start_loc: usize, diffs: &[DiffRecord]) {
    let mut cursor = start_loc;
    for record in diffs {
        match record {
            DiffRecord::Equal(text) => cursor += text.chars().count(),
            DiffRecord::Delete(text) => {
                let n = text.chars().count();
                let end = (cursor + n).min(buffer.len());
                buffer.splice(cursor..end, std::iter::empty());
            }
            DiffRecord::Insert(text) => {
                let chars: Vec<char> = text.chars().collect();
                let n = chars.len();
                buffer.splice(cursor..cursor, chars);
                cursor += n;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::textdiff::diff_main;

    #[test]
    fn make_then_apply_reconstructs_text2() {
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "The quick red fox leaps over the lazy dog.";
        let diffs = diff_main(text1, text2);
        let cfg = TextDiffConfig::default();
        let patches = patch_make(text1, &diffs, &cfg);
        let (applied, results) = patch_apply(&patches, text1, &cfg);
        assert!(results.iter().all(|&ok| ok));
        assert_eq!(applied, text2);
    }

    #[test]
    fn apply_tolerates_shifted_context() {
        let text1 = "alpha beta gamma delta epsilon";
        let text2 = "alpha beta GAMMA delta epsilon";
        let diffs = diff_main(text1, text2);
        let cfg = TextDiffConfig::default();
        let patches = patch_make(text1, &diffs, &cfg);

        let drifted = format!("prefix-- {text1}");
        let (applied, results) = patch_apply(&patches, &drifted, &cfg);
        assert!(results.iter().all(|&ok| ok));
        assert!(applied.contains("GAMMA"));
    }

    #[test]
    fn unmatched_patch_reports_failure_without_panicking() {
        let text1 = "one two three";
        let text2 = "one TWO three";
        let diffs = diff_main(text1, text2);
        let cfg = TextDiffConfig::default();
        let patches = patch_make(text1, &diffs, &cfg);
        let (_, results) = patch_apply(&patches, "completely unrelated content here", &cfg);
        assert!(results.iter().any(|&ok| !ok));
    }
}
