//! Fuzzy substring location (`match_main`).
//!
//! Finds the best-scoring occurrence of `pattern` in `text` near an
//! expected location, tolerating small content drift. Patterns within
//! [`TextDiffConfig::match_max_bits`] are scored with a sliding
//! Hamming-window approximation of the classic bitap scoring formula
//! (accuracy + proximity); longer patterns fall back to locating the
//! nearest *exact* occurrence, since bitap's bounded bitmask can't
//! represent them.

use super::TextDiffConfig;

/// Locates `pattern` in `text`, preferring matches near `loc`.
///
/// Returns `None` if no location scores within
/// [`TextDiffConfig::match_threshold`].
#[must_use]
pub fn match_main(text: &[char], pattern: &[char], loc: usize, cfg: &TextDiffConfig) -> Option<usize> {
    if pattern.is_empty() {
        return Some(loc.min(text.len()));
    }
    if text.is_empty() {
        return None;
    }
    let loc = loc.min(text.len());

    if loc + pattern.len() <= text.len() && &text[loc..loc + pattern.len()] == pattern {
        return Some(loc);
    }

    if pattern.len() > cfg.match_max_bits as usize {
        return nearest_exact(text, pattern, loc);
    }

    match_bitap(text, pattern, loc, cfg)
}

fn nearest_exact(text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
    if pattern.len() > text.len() {
        return None;
    }
    (0..=(text.len() - pattern.len()))
        .filter(|&start| text[start..start + pattern.len()] == *pattern)
        .min_by_key(|&start| (start as isize - loc as isize).abs())
}

fn match_bitap(text: &[char], pattern: &[char], loc: usize, cfg: &TextDiffConfig) -> Option<usize> {
    let distance = cfg.match_distance.max(1) as usize;
    let last_start = text.len() - 1;
    let search_start = loc.saturating_sub(distance).min(last_start);
    let search_end = (loc + distance).min(last_start);

    let mut best: Option<(usize, f64)> = None;
    for start in search_start..=search_end {
        let window_len = pattern.len().min(text.len() - start);
        let mismatches =
            (0..window_len).filter(|&i| text[start + i] != pattern[i]).count() + (pattern.len() - window_len);
        let accuracy = mismatches as f64 / pattern.len() as f64;
        let proximity = (start as isize - loc as isize).unsigned_abs() as f64 / distance as f64;
        let score = accuracy + proximity;
        if score <= cfg.match_threshold && best.is_none_or(|(_, best_score)| score < best_score) {
            best = Some((start, score));
        }
    }
    best.map(|(start, _)| start)
}
