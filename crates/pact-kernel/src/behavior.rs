//! Behavior: a named capability or requirement.
//!
//! A behavior is the unit of promising. A component *provides* a
//! behavior (optionally conditioned on further behavior names it needs
//! from elsewhere) or *wants* one. Equality is structural on
//! (name, conditions), and the derived ordering — name first, then the
//! condition list — is the ordering every provider projection sorts by.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Separator used when an instance tag is appended to a behavior name.
pub const TAG_SEPARATOR: &str = " | ";

/// A named capability, optionally conditioned on other behaviors.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(deny_unknown_fields)]
pub struct Behavior {
    name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<String>,
}

impl Behavior {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
        }
    }

    pub fn with_conditions(mut self, conditions: Vec<String>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    /// True if this behavior's name or any of its conditions matches.
    pub fn mentions(&self, behavior_name: &str) -> bool {
        self.name == behavior_name || self.conditions.iter().any(|c| c == behavior_name)
    }

    /// Sorted unique union of {name} ∪ conditions.
    pub fn names(&self) -> Vec<String> {
        let mut set: BTreeSet<&str> = BTreeSet::new();
        set.insert(&self.name);
        set.extend(self.conditions.iter().map(String::as_str));
        set.into_iter().map(String::from).collect()
    }

    /// Append a condition unless it is already present.
    pub fn add_condition(&mut self, condition: String) {
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
    }

    /// The instance tag rewrite: the provided name gets `provides_tag`,
    /// every condition gets `conditions_tag`.
    pub fn tagged(&self, provides_tag: &str, conditions_tag: &str) -> Behavior {
        Behavior {
            name: format!("{}{}{}", self.name, TAG_SEPARATOR, provides_tag),
            conditions: self
                .conditions
                .iter()
                .map(|c| format!("{c}{TAG_SEPARATOR}{conditions_tag}"))
                .collect(),
        }
    }
}
