//! The [`Operation`]/[`Delta`] wire model.
//!
//! Opcodes are data, not dynamic dispatch: [`Operation`] is a tagged sum
//! type, and the on-wire `{"o": ..., "v": ...}` shape is purely a
//! serialization concern handled by its manual `Serialize`/`Deserialize`
//! impls.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The atomic unit of a delta: an opcode plus optional payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// `+` — insert a new value at an object key or list index.
    Insert(Value),
    /// `-` — delete the value at an object key or list index.
    Delete,
    /// `r` — replace the value wholesale.
    Replace(Value),
    /// `I` — numeric delta `b - a` applied to a `Number`.
    IntegerDelta(f64),
    /// `O` — nested object diff.
    ObjectDiff(Delta),
    /// `L` — nested structural list diff.
    ListDiff(Delta),
    /// `dL` — line-mode list text delta (a TEXTDIFF delta string over the
    /// newline-joined serialization of the list).
    ListTextDelta(String),
    /// `d` — character-level text delta (a TEXTDIFF delta string).
    TextDelta(String),
    /// An opcode outside the closed alphabet `{+,-,r,I,O,L,dL,d}`.
    ///
    /// Receivers treat an unrecognized opcode as a no-op at that position
    /// rather than erroring, so that deltas produced by a newer opcode
    /// alphabet degrade gracefully against an older reader.
    Unknown(String),
}

impl Operation {
    /// The on-wire opcode string for this operation.
    #[must_use]
    pub fn opcode(&self) -> &str {
        match self {
            Self::Insert(_) => "+",
            Self::Delete => "-",
            Self::Replace(_) => "r",
            Self::IntegerDelta(_) => "I",
            Self::ObjectDiff(_) => "O",
            Self::ListDiff(_) => "L",
            Self::ListTextDelta(_) => "dL",
            Self::TextDelta(_) => "d",
            Self::Unknown(o) => o,
        }
    }
}

#[derive(Deserialize)]
struct RawOperation {
    o: String,
    #[serde(default)]
    v: Option<Value>,
}

impl Serialize for Operation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let payload: Option<Value> = match self {
            Self::Insert(v) | Self::Replace(v) => Some(v.clone()),
            Self::Delete | Self::Unknown(_) => None,
            Self::IntegerDelta(d) => {
                Some(serde_json::Number::from_f64(*d).map_or(Value::Null, Value::Number))
            }
            Self::ObjectDiff(delta) | Self::ListDiff(delta) => {
                Some(serde_json::to_value(delta).map_err(serde::ser::Error::custom)?)
            }
            Self::ListTextDelta(s) | Self::TextDelta(s) => Some(Value::String(s.clone())),
        };

        let mut map = serializer.serialize_map(Some(if payload.is_some() { 2 } else { 1 }))?;
        map.serialize_entry("o", self.opcode())?;
        if let Some(payload) = payload {
            map.serialize_entry("v", &payload)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawOperation::deserialize(deserializer)?;
        let op = match raw.o.as_str() {
            "+" => Self::Insert(raw.v.unwrap_or(Value::Null)),
            "-" => Self::Delete,
            "r" => Self::Replace(raw.v.unwrap_or(Value::Null)),
            "I" => Self::IntegerDelta(raw.v.as_ref().and_then(Value::as_f64).unwrap_or(0.0)),
            "O" => Self::ObjectDiff(match raw.v {
                Some(v) => serde_json::from_value(v).map_err(D::Error::custom)?,
                None => Delta::empty(),
            }),
            "L" => Self::ListDiff(match raw.v {
                Some(v) => serde_json::from_value(v).map_err(D::Error::custom)?,
                None => Delta::empty(),
            }),
            "dL" => Self::ListTextDelta(string_payload(raw.v)),
            "d" => Self::TextDelta(string_payload(raw.v)),
            other => Self::Unknown(other.to_owned()),
        };
        Ok(op)
    }
}

fn string_payload(v: Option<Value>) -> String {
    v.and_then(|v| v.as_str().map(str::to_owned)).unwrap_or_default()
}

/// A mapping from field name (object diff) or stringified index (list
/// diff) to [`Operation`]. An empty mapping means "no change".
///
/// `BTreeMap` keeps iteration deterministic; for list deltas the decimal
/// string keys must still be sorted *numerically*, not lexicographically,
/// at the one call site that needs positional order — see
/// [`crate::op::numeric_entries`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delta(BTreeMap<String, Operation>);

impl Delta {
    /// An empty delta ("no change").
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a delta from an iterator of `(key, operation)` pairs.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Operation)>,
    {
        Self(entries.into_iter().collect())
    }

    /// Inserts an operation at `key`, returning the previous one if any.
    pub fn insert(&mut self, key: impl Into<String>, op: Operation) -> Option<Operation> {
        self.0.insert(key.into(), op)
    }

    /// Removes the operation at `key`.
    pub fn remove(&mut self, key: &str) -> Option<Operation> {
        self.0.remove(key)
    }

    /// Looks up the operation at `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Operation> {
        self.0.get(key)
    }

    /// True when this delta expresses no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates entries in lexicographic key order (use
    /// [`numeric_entries`] for list deltas).
    pub fn iter(&self) -> btree_map::Iter<'_, String, Operation> {
        self.0.iter()
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Operation> {
        self.0.keys()
    }
}

impl FromIterator<(String, Operation)> for Delta {
    fn from_iter<I: IntoIterator<Item = (String, Operation)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl IntoIterator for Delta {
    type Item = (String, Operation);
    type IntoIter = btree_map::IntoIter<String, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Parses a list-delta key as a `usize` index.
///
/// List indices are represented as decimal strings so that list and
/// object deltas share the same `Delta` shape. Keys that fail to parse
/// are skipped by [`numeric_entries`] rather than causing an error,
/// matching the "unrecognized input is a no-op" posture applied to
/// unknown opcodes.
#[must_use]
pub fn parse_index(key: &str) -> Option<usize> {
    key.parse().ok()
}

/// Returns a delta's entries sorted **numerically** by list index, rather
/// than the lexicographic order a plain string sort would give (sorting
/// `"10"` before `"2"` would misplace every patch position past index 9).
#[must_use]
pub fn numeric_entries(delta: &Delta) -> Vec<(usize, &Operation)> {
    let mut entries: Vec<(usize, &Operation)> =
        delta.iter().filter_map(|(key, op)| parse_index(key).map(|index| (index, op))).collect();
    entries.sort_by_key(|(index, _)| *index);
    entries
}
