//! Benchmark fixtures for `json-delta-core`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use json_delta_core::policy::{Otype, Policy};
use serde_json::{json, Value};

/// A before/after document pair benchmarked under a shared name, together
/// with the policy that produces its intended opcode mix (structural list
/// diff, integer delta, or character-level text delta).
pub struct Corpus {
    name: &'static str,
    before: Value,
    after: Value,
    policy: Policy,
}

impl Corpus {
    /// The corpus's identifier, used as a Criterion benchmark label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The value to diff from.
    #[must_use]
    pub fn before(&self) -> &Value {
        &self.before
    }

    /// The value to diff to.
    #[must_use]
    pub fn after(&self) -> &Value {
        &self.after
    }

    /// The policy this corpus is benchmarked under.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Serialized byte size of `before`, used to compute throughput.
    #[must_use]
    pub fn fixture_bytes(&self) -> usize {
        serde_json::to_vec(&self.before).map(|bytes| bytes.len()).unwrap_or(0)
    }
}

fn shuffled_range(len: i32) -> Vec<i32> {
    let mut v: Vec<i32> = (0..len).collect();
    v.swap(3, 40);
    v.insert(10, -1);
    v.remove(25);
    v
}

/// Representative documents spanning the shapes `diff`/`apply_diff` are
/// tuned for: a flat config-like object, a reordered list, and a
/// paragraph of prose edited in a few places.
#[must_use]
pub fn available_corpora() -> Vec<Corpus> {
    vec![
        Corpus {
            name: "flat-object",
            before: json!({
                "id": 1,
                "name": "ada lovelace",
                "active": true,
                "score": 10,
            }),
            after: json!({
                "id": 1,
                "name": "ada lovelace",
                "active": false,
                "score": 42,
            }),
            policy: Policy::new().with_attribute("score", Policy::new().with_otype(Otype::Integer)),
        },
        Corpus {
            name: "reordered-list",
            before: json!({"items": (0..50).collect::<Vec<_>>()}),
            after: json!({"items": shuffled_range(50)}),
            // Structural list diffing is opt-in; force it so this corpus
            // actually exercises `diff_lists`' prefix/suffix trim instead
            // of benchmarking a whole-array replace.
            policy: Policy::new().with_attribute("items", Policy::new().with_otype(Otype::List)),
        },
        Corpus {
            name: "prose-edit",
            before: json!({
                "body": "The quick brown fox jumps over the lazy dog. \
                          Pack my box with five dozen liquor jugs. \
                          How vexingly quick daft zebras jump!"
            }),
            after: json!({
                "body": "The quick brown fox leaps over the lazy dog. \
                          Pack my box with six dozen liquor jugs. \
                          How vexingly fast daft zebras jump!"
            }),
            policy: Policy::new().with_attribute("body", Policy::new().with_otype(Otype::String)),
        },
    ]
}
