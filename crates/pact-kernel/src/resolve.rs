//! The resolver: recursive satisfaction search over the working table.
//!
//! One behavior is satisfied when ANY provider's offer holds (OR
//! across providers) and an offer holds when EVERY condition behavior
//! resolves satisfied (AND across conditions). The search carries an
//! explicit visited path; re-entering a behavior already on the path
//! yields a cycle leaf instead of recursing, and the cycle leaf is
//! unsatisfied so enclosing offers fail the ordinary way.

use crate::registry::Registry;
use crate::resolution::{Offer, Resolution};

impl Registry {
    /// Resolve a behavior into the full explanatory tree, both sides
    /// populated. Output order follows provider sort order, so
    /// repeated calls over an unchanged registry are deep-equal.
    pub fn full_resolve(&self, behavior_name: &str) -> Resolution {
        let mut path = Vec::new();
        self.resolve_inner(behavior_name, &mut path)
    }

    /// Resolve then prune: the tree a caller presents, with the losing
    /// side of each settled node dropped.
    pub fn resolve(&self, behavior_name: &str) -> Resolution {
        self.full_resolve(behavior_name).prune()
    }

    fn resolve_inner(&self, behavior_name: &str, path: &mut Vec<String>) -> Resolution {
        if path.iter().any(|seen| seen == behavior_name) {
            let mut cycle = path.clone();
            cycle.push(behavior_name.to_string());
            return Resolution::cycle_leaf(behavior_name, cycle);
        }

        let mut resolution = Resolution::new(behavior_name);
        path.push(behavior_name.to_string());
        for provider in self.behavior_providers(behavior_name) {
            if provider.behavior.is_unconditional() {
                resolution.add_satisfied(Offer::new(&provider.component_name));
                continue;
            }
            let children: Vec<Resolution> = provider
                .behavior
                .conditions()
                .iter()
                .map(|condition| self.resolve_inner(condition, path))
                .collect();
            let holds = children.iter().all(Resolution::is_satisfied);
            let offer = Offer::conditional(&provider.component_name, children);
            if holds {
                resolution.add_satisfied(offer);
            } else {
                resolution.add_unsatisfied(offer);
            }
        }
        path.pop();
        resolution
    }
}
