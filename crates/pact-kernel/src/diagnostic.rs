//! Diagnostics: engine failure surfaced as data.
//!
//! The registry and the contract model never raise on well-formed
//! records; conditions worth reporting (provide cycles inside an
//! instance merge, invalid name tokens at the boundary) become
//! `Diagnostic` values.

use serde::{Deserialize, Serialize};

pub mod failure_class {
    /// A provide→provide chain inside one component loops back on itself.
    pub const PROVIDE_CYCLE: &str = "provide_cycle";
    /// A behavior dependency chain loops back on itself during resolve.
    pub const BEHAVIOR_CYCLE: &str = "behavior_cycle";
    /// A name token falls outside the letters/digits/hyphen contract.
    pub const INVALID_NAME: &str = "invalid_name";
}

/// One reportable condition, with the path that led to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub failure_class: String,
    /// Names from outermost to the offending element.
    pub path: Vec<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(failure_class: &str, path: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            failure_class: failure_class.to_string(),
            path,
            message: message.into(),
        }
    }
}
