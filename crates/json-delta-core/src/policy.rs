//! Recursive policy resolution.
//!
//! A [`Policy`] overrides the type-based opcode dispatch in [`crate::diff`]
//! at specific locations. Resolution is pure and lazy: each recursion step
//! asks the current policy for the sub-policy of the next key or list item.

use std::collections::BTreeMap;

/// Forces the opcode choice at a node, overriding type-based dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Otype {
    /// Always replace whole.
    Replace,
    /// Diff structurally as a list, trimming common prefix/suffix.
    List,
    /// Diff as a line-mode text delta over newline-joined elements.
    ListDmp,
    /// Diff as an integer delta (`b - a`).
    Integer,
    /// Diff as a character-level text delta.
    String,
}

/// Recursive configuration describing how to diff specific locations.
///
/// Policy absence at a node means "choose by runtime type".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Policy {
    otype: Option<Otype>,
    attributes: BTreeMap<String, Policy>,
    item: Option<Box<Policy>>,
}

impl Policy {
    /// Builds an empty policy (pure type dispatch, no overrides).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a policy that forces `otype` at this node.
    #[must_use]
    pub fn with_otype(mut self, otype: Otype) -> Self {
        self.otype = Some(otype);
        self
    }

    /// Attaches a sub-policy for an object field.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, policy: Policy) -> Self {
        self.attributes.insert(key.into(), policy);
        self
    }

    /// Attaches the sub-policy applied uniformly to list elements.
    #[must_use]
    pub fn with_item(mut self, policy: Policy) -> Self {
        self.item = Some(Box::new(policy));
        self
    }

    /// Returns the opcode override at this node, if any.
    #[must_use]
    pub fn otype(&self) -> Option<Otype> {
        self.otype
    }

    /// Resolves the sub-policy for descending into an object field.
    ///
    /// ```
    /// # use json_delta_core::policy::{Otype, Policy};
    /// let policy = Policy::new().with_attribute("n", Policy::new().with_otype(Otype::Integer));
    /// assert_eq!(policy.attribute("n").unwrap().otype(), Some(Otype::Integer));
    /// assert!(policy.attribute("missing").is_none());
    /// ```
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Policy> {
        self.attributes.get(key)
    }

    /// Resolves the sub-policy applied uniformly to each list element.
    #[must_use]
    pub fn item(&self) -> Option<&Policy> {
        self.item.as_deref()
    }
}
