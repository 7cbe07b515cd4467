//! Component: a named bundle of provided and wanted behaviors.
//!
//! Component names are not globally unique — multiple independently
//! declared variants may share one name, and the registry folds them.
//! Identity is content-addressed: `content_hash()` is the one
//! structural-equality operator the registry dedups with.
//!
//! The wire form may carry `globalConditions`, which are appended to
//! every provide on decode and factored back out on encode.

use crate::behavior::Behavior;
use crate::diagnostic::{Diagnostic, failure_class};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// A content-addressed hash identifying a component variant.
///
/// Two variants with the same hash are structurally the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn builder() -> ContentHashBuilder {
        ContentHashBuilder {
            hasher: Sha256::new(),
        }
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Incremental hash builder. Fields are fed in a stable order so the
/// hash is deterministic across processes.
pub struct ContentHashBuilder {
    hasher: Sha256,
}

impl ContentHashBuilder {
    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b":");
        self.hasher.update(value.as_bytes());
        self.hasher.update(b"\n");
        self
    }

    pub fn finish(self) -> ContentHash {
        let hash = self.hasher.finalize();
        ContentHash(format!("{hash:x}"))
    }
}

/// Wire form of a component document.
///
/// `globalConditions` is authoring sugar: conditions every provide
/// shares. The in-memory `Component` always carries them inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<Behavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wants: Vec<Behavior>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_conditions: Vec<String>,
}

impl From<ComponentDoc> for Component {
    fn from(doc: ComponentDoc) -> Self {
        let mut provides = doc.provides;
        for p in &mut provides {
            for gc in &doc.global_conditions {
                p.add_condition(gc.clone());
            }
        }
        Component {
            name: doc.name,
            comment: doc.comment,
            provides,
            wants: doc.wants,
        }
    }
}

impl From<Component> for ComponentDoc {
    fn from(c: Component) -> Self {
        let mut shared: Vec<String> = c
            .conditions()
            .into_iter()
            .filter(|cond| c.provides.iter().all(|p| p.conditions().contains(cond)))
            .collect();
        shared.sort();
        let provides = c
            .provides
            .iter()
            .map(|p| {
                let kept: Vec<String> = p
                    .conditions()
                    .iter()
                    .filter(|cond| !shared.contains(cond))
                    .cloned()
                    .collect();
                Behavior::new(p.name()).with_conditions(kept)
            })
            .collect();
        ComponentDoc {
            name: c.name,
            comment: c.comment,
            provides,
            wants: c.wants,
            global_conditions: shared,
        }
    }
}

/// A named bundle of provides + wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ComponentDoc")]
#[serde(into = "ComponentDoc")]
pub struct Component {
    name: String,
    comment: String,
    provides: Vec<Behavior>,
    wants: Vec<Behavior>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            provides: Vec::new(),
            wants: Vec::new(),
        }
    }

    pub fn with_provides(mut self, provides: Vec<Behavior>) -> Self {
        self.provides = provides;
        self
    }

    pub fn with_wants(mut self, wants: Vec<Behavior>) -> Self {
        self.wants = wants;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn add_provide(&mut self, p: Behavior) {
        self.provides.push(p);
    }

    pub fn add_want(&mut self, w: Behavior) {
        self.wants.push(w);
    }

    /// Provided behaviors, optionally filtered by name, sorted by
    /// (name, conditions). An unmatched filter yields an empty list.
    pub fn provides(&self, filter: Option<&str>) -> Vec<Behavior> {
        let mut ret: Vec<Behavior> = self
            .provides
            .iter()
            .filter(|p| filter.is_none_or(|f| p.name() == f))
            .cloned()
            .collect();
        ret.sort();
        ret
    }

    /// Wanted behaviors, same filtering and ordering as `provides`.
    pub fn wants(&self, filter: Option<&str>) -> Vec<Behavior> {
        let mut ret: Vec<Behavior> = self
            .wants
            .iter()
            .filter(|w| filter.is_none_or(|f| w.name() == f))
            .cloned()
            .collect();
        ret.sort();
        ret
    }

    /// Sorted unique names of wanted behaviors.
    pub fn want_names(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.wants.iter().map(Behavior::name).collect();
        set.into_iter().map(String::from).collect()
    }

    /// Every condition appearing on any provide, sorted unique.
    pub fn conditions(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .provides
            .iter()
            .flat_map(|p| p.conditions().iter().cloned())
            .collect();
        set.into_iter().collect()
    }

    /// Sorted unique union of behavior names across wants and provides.
    pub fn names(&self) -> Vec<String> {
        let mut set: BTreeSet<String> = BTreeSet::new();
        for b in self.wants.iter().chain(self.provides.iter()) {
            set.extend(b.names());
        }
        set.into_iter().collect()
    }

    pub fn mentions(&self, behavior_name: &str) -> bool {
        self.provides.iter().any(|p| p.mentions(behavior_name))
            || self.wants.iter().any(|w| w.name() == behavior_name)
    }

    /// Content hash over all fields. The registry's dedup criterion.
    pub fn content_hash(&self) -> ContentHash {
        let mut b = ContentHash::builder()
            .field("name", &self.name)
            .field("comment", &self.comment);
        for p in &self.provides {
            b = b
                .field("provide", p.name())
                .field("conditions", &p.conditions().join("\u{1f}"));
        }
        for w in &self.wants {
            b = b
                .field("want", w.name())
                .field("conditions", &w.conditions().join("\u{1f}"));
        }
        b.finish()
    }

    /// Append the other component's provides and wants, skipping any
    /// behavior already present. Declaration order is preserved.
    pub fn merge(&mut self, other: &Component) {
        for p in &other.provides {
            if !self.provides.contains(p) {
                self.provides.push(p.clone());
            }
        }
        for w in &other.wants {
            if !self.wants.contains(w) {
                self.wants.push(w.clone());
            }
        }
    }

    /// Fold conditions satisfied by other provides of this same
    /// component into the external conditions those internal links
    /// require, expanding the Cartesian product across alternative
    /// internal satisfiers.
    ///
    /// A provide→provide cycle is reported as a `provide_cycle`
    /// diagnostic and the cyclic condition is left in place.
    pub fn reduce(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let internal: BTreeSet<String> =
            self.provides.iter().map(|p| p.name().to_string()).collect();
        let mut reduced: Vec<Behavior> = Vec::new();
        for provide in &self.provides {
            let mut path = vec![provide.name().to_string()];
            let alternatives = expand_conditions(
                provide.conditions(),
                &self.provides,
                &internal,
                &mut path,
                &mut diagnostics,
                &self.name,
            );
            for alt in alternatives {
                reduced.push(Behavior::new(provide.name()).with_conditions(alt.into_iter().collect()));
            }
        }
        reduced.sort();
        reduced.dedup();
        self.provides = reduced;
        diagnostics
    }

    /// Build the synthetic instance component: renamed, provides
    /// tagged, wants carried over untouched.
    pub fn instancized(
        &self,
        instance_name: &str,
        provides_tag: &str,
        conditions_tag: &str,
    ) -> Component {
        Component::new(instance_name)
            .with_provides(
                self.provides
                    .iter()
                    .map(|p| p.tagged(provides_tag, conditions_tag))
                    .collect(),
            )
            .with_wants(self.wants.clone())
    }
}

/// Expand a condition list into the alternative external condition
/// sets it reduces to. `path` tracks the internal provide names being
/// expanded; revisiting one is a cycle.
fn expand_conditions(
    conditions: &[String],
    provides: &[Behavior],
    internal: &BTreeSet<String>,
    path: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
    component_name: &str,
) -> Vec<BTreeSet<String>> {
    let mut alternatives: Vec<BTreeSet<String>> = vec![BTreeSet::new()];
    for condition in conditions {
        if !internal.contains(condition) {
            for alt in &mut alternatives {
                alt.insert(condition.clone());
            }
            continue;
        }
        if path.iter().any(|seen| seen == condition) {
            let mut cycle = path.clone();
            cycle.push(condition.clone());
            diagnostics.push(Diagnostic::new(
                failure_class::PROVIDE_CYCLE,
                cycle,
                format!("provide cycle within component {component_name}"),
            ));
            for alt in &mut alternatives {
                alt.insert(condition.clone());
            }
            continue;
        }
        path.push(condition.clone());
        let mut expansions: Vec<BTreeSet<String>> = Vec::new();
        for satisfier in provides.iter().filter(|p| p.name() == condition.as_str()) {
            expansions.extend(expand_conditions(
                satisfier.conditions(),
                provides,
                internal,
                path,
                diagnostics,
                component_name,
            ));
        }
        path.pop();
        let mut next: Vec<BTreeSet<String>> = Vec::new();
        for alt in &alternatives {
            for expansion in &expansions {
                let mut merged = alt.clone();
                merged.extend(expansion.iter().cloned());
                if !next.contains(&merged) {
                    next.push(merged);
                }
            }
        }
        alternatives = next;
    }
    alternatives
}
