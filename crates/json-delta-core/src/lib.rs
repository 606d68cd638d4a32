//! Structural diff, patch, and operational-transform engine for
//! JSON-shaped values, with a character-level text-diff collaborator for
//! string and line-mode list content.
//!
//! ```
//! use json_delta_core::{diff, apply_diff, policy::Policy, textdiff::TextDiffConfig};
//! use serde_json::json;
//!
//! let a = json!({"name": "ada", "tags": ["math"]});
//! let b = json!({"name": "ada", "tags": ["math", "logic"]});
//!
//! let cfg = TextDiffConfig::default();
//! let op = diff(&a, &b, &Policy::new(), &cfg).expect("a and b differ");
//! let patched = apply_diff(&a, &op, &cfg).unwrap();
//! assert_eq!(patched, b);
//! ```

pub mod diff;
pub mod error;
pub mod offsets;
pub mod op;
pub mod patch;
pub mod policy;
pub mod text_bridge;
pub mod textdiff;
pub mod transform;
pub mod value;

pub use diff::diff;
pub use error::DeltaError;
pub use offsets::{apply_diff_with_offsets, apply_object_diff_with_offsets, patch_apply_with_offsets};
pub use op::{Delta, Operation};
pub use patch::apply_diff;
pub use policy::{Otype, Policy};
pub use transform::transform;
pub use value::{equals, type_of, ValueType};
