use serde_json::Value;

use crate::op::Operation;
use crate::text_bridge;
use crate::textdiff;

/// Diffs two lists by serializing each to newline-delimited JSON and
/// running a line-mode text diff, producing a single [`Operation::ListTextDelta`].
///
/// Unlike [`super::diff_lists`], this treats the whole list as one
/// textual unit: a good fit when elements are reordered or when many
/// small structural edits would otherwise be cheaper to express as a
/// handful of line moves.
#[must_use]
pub fn diff_list_dmp(a: &[Value], b: &[Value]) -> Operation {
    let text1 = text_bridge::to_lines(a);
    let text2 = text_bridge::to_lines(b);
    let mut diffs = textdiff::diff_line_mode(&text1, &text2);
    textdiff::cleanup_efficiency(&mut diffs);
    Operation::ListTextDelta(textdiff::to_delta(&diffs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeltaError;
    use crate::text_bridge::from_lines;
    use crate::textdiff::{diff_text1, from_delta};
    use serde_json::json;

    #[test]
    fn encodes_a_reordering_as_one_text_delta() -> Result<(), DeltaError> {
        let a = vec![json!("alpha"), json!("beta"), json!("gamma")];
        let b = vec![json!("beta"), json!("alpha"), json!("gamma")];
        let op = diff_list_dmp(&a, &b);
        let Operation::ListTextDelta(delta) = op else { panic!("expected ListTextDelta") };

        let text1 = text_bridge::to_lines(&a);
        let diffs = from_delta(&text1, &delta).unwrap();
        assert_eq!(diff_text1(&diffs), text1);
        let patched = crate::textdiff::diff_text2(&diffs);
        assert_eq!(from_lines(&patched)?, b);
        Ok(())
    }
}
