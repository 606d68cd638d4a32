//! Compact delta-string encoding (`diff_toDelta` / `diff_fromDelta`).
//!
//! The format is a sequence of `\t`-separated tokens: `=N` (N characters
//! of `text1` are unchanged), `-N` (N characters of `text1` were
//! deleted), `+<text>` (text was inserted, percent-encoded so `\t` and
//! `\n` can't be mistaken for a token separator).

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::DeltaError;
use crate::textdiff::DiffRecord;

const ENCODE_SET: &AsciiSet = &CONTROLS.add(b'%').add(b'\t').add(b'\n').add(b'\r');

/// Encodes a diff as a delta string relative to its pre-image (`text1`).
#[must_use]
pub fn to_delta(diffs: &[DiffRecord]) -> String {
    diffs
        .iter()
        .map(|record| match record {
            DiffRecord::Equal(text) => format!("={}", text.chars().count()),
            DiffRecord::Delete(text) => format!("-{}", text.chars().count()),
            DiffRecord::Insert(text) => format!("+{}", utf8_percent_encode(text, ENCODE_SET)),
        })
        .collect::<Vec<_>>()
        .join("\t")
}

/// Decodes a delta string back into a diff, given the original `text1`.
///
/// # Errors
///
/// Returns [`DeltaError::MalformedDelta`] if a token's count can't be
/// parsed, an `=`/`-` run would read past the end of `text1`, a `+` run
/// isn't valid percent-encoded UTF-8, or a token starts with an
/// unrecognized tag.
pub fn from_delta(text1: &str, delta: &str) -> Result<Vec<DiffRecord>, DeltaError> {
    let chars1: Vec<char> = text1.chars().collect();
    let mut pos = 0usize;
    let mut out = Vec::new();

    if delta.is_empty() {
        return Ok(out);
    }

    for token in delta.split('\t') {
        if token.is_empty() {
            continue;
        }
        let (tag, rest) = token.split_at(1);
        match tag {
            "=" | "-" => {
                let n: usize = rest
                    .parse()
                    .map_err(|_| DeltaError::MalformedDelta { reason: format!("bad run length in {token:?}") })?;
                if pos + n > chars1.len() {
                    return Err(DeltaError::MalformedDelta {
                        reason: format!("run of {n} chars at offset {pos} exceeds text1 length {}", chars1.len()),
                    });
                }
                let text: String = chars1[pos..pos + n].iter().collect();
                pos += n;
                out.push(if tag == "=" { DiffRecord::Equal(text) } else { DiffRecord::Delete(text) });
            }
            "+" => {
                let decoded = percent_decode_str(rest)
                    .decode_utf8()
                    .map_err(|e| DeltaError::MalformedDelta { reason: e.to_string() })?;
                out.push(DiffRecord::Insert(decoded.into_owned()));
            }
            other => {
                return Err(DeltaError::MalformedDelta { reason: format!("unrecognized delta tag {other:?}") });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_delta_string() {
        let diffs = crate::textdiff::diff_main("the cat sat", "the hat sat");
        let delta = to_delta(&diffs);
        let decoded = from_delta("the cat sat", &delta).unwrap();
        assert_eq!(crate::textdiff::diff_text2(&decoded), "the hat sat");
    }

    #[test]
    fn encodes_tabs_and_newlines_in_inserts() {
        let diffs = vec![DiffRecord::Insert("a\tb\nc".into())];
        let delta = to_delta(&diffs);
        assert!(!delta.contains('\n'));
        let decoded = from_delta("", &delta).unwrap();
        assert_eq!(decoded, diffs);
    }

    #[test]
    fn rejects_run_past_text1_end() {
        let err = from_delta("ab", "=5").unwrap_err();
        assert!(matches!(err, DeltaError::MalformedDelta { .. }));
    }
}
