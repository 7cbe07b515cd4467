//! Resolution tree: the tagged AND/OR satisfaction outcome.
//!
//! A `Resolution` answers one behavior query and holds the competing
//! `Offer`s (OR); a conditional offer holds one child resolution per
//! condition (AND). Nodes are owned by their parents — there is no
//! shared structure.
//!
//! The wire form is the legacy convention consumers already parse:
//! `satisfied`/`unsatisfied` keys appear only when non-empty, except
//! that a leaf with no offers at all emits `unsatisfied: []` so it is
//! visibly unresolved. A cycle leaf — the one shape the legacy format
//! never had, because the legacy resolver hung instead — serializes
//! `{behavior, cycle: [path...]}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::VecDeque;

/// How a resolution concluded.
///
/// The wire form conflates `NoProvider` with `Unsatisfied` (both are
/// an empty or populated `unsatisfied` list); the verdict keeps them
/// distinct for consumers that care why a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Satisfied,
    /// Providers were found, but every one of them failed.
    Unsatisfied,
    /// No provider offers this behavior at all.
    NoProvider,
    /// The query re-entered a behavior already on the resolution path.
    CycleDetected,
}

/// One candidate provider for a behavior, with a child resolution per
/// condition when conditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Offer {
    component: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<Resolution>,
}

impl Offer {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            conditions: Vec::new(),
        }
    }

    pub fn conditional(component: impl Into<String>, conditions: Vec<Resolution>) -> Self {
        Self {
            component: component.into(),
            conditions,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn conditions(&self) -> &[Resolution] {
        &self.conditions
    }

    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    fn prune(&self) -> Offer {
        Offer {
            component: self.component.clone(),
            conditions: self.conditions.iter().map(Resolution::prune).collect(),
        }
    }

    fn collapse(&self, side: Side) -> Offer {
        // Same-component hops may stack several levels deep, so the
        // promotion runs as a worklist until only external conditions
        // remain. An unconditional internal hop vanishes outright.
        let mut conditions = Vec::new();
        let mut queue: VecDeque<&Resolution> = self.conditions.iter().collect();
        while let Some(condition) = queue.pop_front() {
            match side.offers(condition) {
                [single] if single.component == self.component => {
                    queue.extend(single.conditions.iter());
                }
                _ => conditions.push(condition.collapse()),
            }
        }
        Offer {
            component: self.component.clone(),
            conditions,
        }
    }
}

/// Which side of a resolution a collapse walk follows.
#[derive(Clone, Copy)]
enum Side {
    Satisfied,
    Unsatisfied,
}

impl Side {
    fn offers(self, resolution: &Resolution) -> &[Offer] {
        match self {
            Side::Satisfied => &resolution.satisfied,
            Side::Unsatisfied => &resolution.unsatisfied,
        }
    }
}

/// The AND/OR satisfaction outcome for one behavior query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ResolutionRepr")]
pub struct Resolution {
    behavior: String,
    satisfied: Vec<Offer>,
    unsatisfied: Vec<Offer>,
    cycle: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolutionRepr {
    behavior: String,
    #[serde(default)]
    satisfied: Vec<Offer>,
    #[serde(default)]
    unsatisfied: Vec<Offer>,
    #[serde(default)]
    cycle: Option<Vec<String>>,
}

impl From<ResolutionRepr> for Resolution {
    fn from(repr: ResolutionRepr) -> Self {
        Resolution {
            behavior: repr.behavior,
            satisfied: repr.satisfied,
            unsatisfied: repr.unsatisfied,
            cycle: repr.cycle,
        }
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("behavior", &self.behavior)?;
        if let Some(path) = &self.cycle {
            map.serialize_entry("cycle", path)?;
        } else {
            if !self.satisfied.is_empty() {
                map.serialize_entry("satisfied", &self.satisfied)?;
            }
            if !self.unsatisfied.is_empty() || self.satisfied.is_empty() {
                map.serialize_entry("unsatisfied", &self.unsatisfied)?;
            }
        }
        map.end()
    }
}

impl Resolution {
    pub fn new(behavior: impl Into<String>) -> Self {
        Self {
            behavior: behavior.into(),
            satisfied: Vec::new(),
            unsatisfied: Vec::new(),
            cycle: None,
        }
    }

    /// The leaf returned when resolving re-enters `behavior`; `path`
    /// runs from the root query to the repeated name.
    pub fn cycle_leaf(behavior: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            behavior: behavior.into(),
            satisfied: Vec::new(),
            unsatisfied: Vec::new(),
            cycle: Some(path),
        }
    }

    pub fn behavior(&self) -> &str {
        &self.behavior
    }

    pub fn satisfied(&self) -> &[Offer] {
        &self.satisfied
    }

    pub fn unsatisfied(&self) -> &[Offer] {
        &self.unsatisfied
    }

    pub fn cycle(&self) -> Option<&[String]> {
        self.cycle.as_deref()
    }

    pub fn add_satisfied(&mut self, offer: Offer) {
        self.satisfied.push(offer);
    }

    pub fn add_unsatisfied(&mut self, offer: Offer) {
        self.unsatisfied.push(offer);
    }

    pub fn is_satisfied(&self) -> bool {
        !self.satisfied.is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        if self.cycle.is_some() {
            Verdict::CycleDetected
        } else if !self.satisfied.is_empty() {
            Verdict::Satisfied
        } else if self.unsatisfied.is_empty() {
            Verdict::NoProvider
        } else {
            Verdict::Unsatisfied
        }
    }

    /// Drop the losing side once the verdict is known, bottom-up: a
    /// satisfied resolution keeps only its (pruned) satisfied offers,
    /// an unsatisfied one only its pruned unsatisfied offers.
    pub fn prune(&self) -> Resolution {
        if self.cycle.is_some() {
            return self.clone();
        }
        if self.is_satisfied() {
            Resolution {
                behavior: self.behavior.clone(),
                satisfied: self.satisfied.iter().map(Offer::prune).collect(),
                unsatisfied: Vec::new(),
                cycle: None,
            }
        } else {
            Resolution {
                behavior: self.behavior.clone(),
                satisfied: Vec::new(),
                unsatisfied: self.unsatisfied.iter().map(Offer::prune).collect(),
                cycle: None,
            }
        }
    }

    /// Presentation-only: remove pass-through hops where a condition's
    /// single offer names the same component as the offer above it.
    /// Meant for pruned trees; never changes the computed verdict.
    pub fn collapse(&self) -> Resolution {
        let mut ret = Resolution::new(&self.behavior);
        ret.cycle = self.cycle.clone();
        for offer in &self.satisfied {
            ret.satisfied.push(offer.collapse(Side::Satisfied));
        }
        for offer in &self.unsatisfied {
            ret.unsatisfied.push(offer.collapse(Side::Unsatisfied));
        }
        ret
    }
}
