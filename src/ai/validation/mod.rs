//! Completion Text Validation
//!
//! JSON recovery for completion text. Models wrap objects in code fences,
//! surround them with prose, or cut them off mid-string; this layer turns
//! whatever is recoverable back into a `serde_json` object.

mod json_repair;

pub use json_repair::{JsonRepairer, extract_json_object};
