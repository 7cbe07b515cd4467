//! Registry: raw component variants, collective definitions, and the
//! derived working table the resolver queries.
//!
//! The raw table is append-only with content-hash dedup. The working
//! table is freshly rebuilt from raw + collectives on every structural
//! change — there is no in-place patching and no aliasing between the
//! two views. Every raw name appears in the working table either
//! standalone (unclaimed) or folded into exactly one synthesized
//! collective or instance component (claimed).
//!
//! No operation raises. Unknown queries return empty collections;
//! conditions worth reporting surface as `diagnostics()`.

use crate::behavior::Behavior;
use crate::collective::{Collective, Record};
use crate::component::Component;
use crate::diagnostic::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One (component, provided behavior) pair matching a provider query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorProvider {
    pub component_name: String,
    pub behavior: Behavior,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    raw: BTreeMap<String, Vec<Component>>,
    collectives: BTreeMap<String, Collective>,
    working: BTreeMap<String, Component>,
    diagnostics: Vec<Diagnostic>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch an input record by kind.
    pub fn add(&mut self, record: Record) {
        match record {
            Record::Component(c) => self.add_component(c),
            Record::Collective(c) => self.add_collective(c),
        }
    }

    /// Append a component variant unless a structurally identical one
    /// already exists, then re-derive the working table.
    pub fn add_component(&mut self, component: Component) {
        let variants = self.raw.entry(component.name().to_string()).or_default();
        let hash = component.content_hash();
        if variants.iter().any(|v| v.content_hash() == hash) {
            return;
        }
        variants.push(component);
        self.rebuild();
    }

    /// Install a collective, replacing any prior one of the same name,
    /// then re-derive the working table.
    pub fn add_collective(&mut self, collective: Collective) {
        self.collectives
            .insert(collective.name().to_string(), collective);
        self.rebuild();
    }

    fn rebuild(&mut self) {
        let mut working: BTreeMap<String, Component> = BTreeMap::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        let mut claimed: BTreeSet<String> = BTreeSet::new();
        for collective in self.collectives.values() {
            claimed.extend(collective.claimed());
        }

        for collective in self.collectives.values() {
            if !collective.members().is_empty() || collective.instances().is_empty() {
                // Flat fold: one aggregate under the collective's own
                // name, wants and provides concatenated unmodified.
                let mut aggregate =
                    Component::new(collective.name()).with_comment(collective.comment());
                for member in collective.members() {
                    for variant in self.variants_of(member) {
                        aggregate.merge(variant);
                    }
                }
                working.insert(collective.name().to_string(), aggregate);
            }
            for instance in collective.instances() {
                let mut merged = Component::new(&instance.name);
                for member in &instance.components {
                    for variant in self.variants_of(member) {
                        merged.merge(variant);
                    }
                }
                diagnostics.extend(merged.reduce());
                let synthesized = merged.instancized(
                    &instance.name,
                    &instance.provides_tag,
                    &instance.conditions_tag,
                );
                working.insert(instance.name.clone(), synthesized);
            }
        }

        for (name, variants) in &self.raw {
            if claimed.contains(name) || working.contains_key(name) {
                continue;
            }
            let mut folded = variants[0].clone();
            for variant in &variants[1..] {
                folded.merge(variant);
            }
            working.insert(name.clone(), folded);
        }

        self.working = working;
        self.diagnostics = diagnostics;
    }

    fn variants_of(&self, name: &str) -> &[Component] {
        self.raw.get(name).map_or(&[], Vec::as_slice)
    }

    // ── Read-only projections over the working table ──

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    /// Names in the working table, sorted.
    pub fn component_names(&self) -> Vec<String> {
        self.working.keys().cloned().collect()
    }

    /// Raw variants recorded under a name; empty when unknown.
    pub fn component_variants(&self, name: &str) -> &[Component] {
        self.variants_of(name)
    }

    pub fn collective_names(&self) -> Vec<String> {
        self.collectives.keys().cloned().collect()
    }

    /// Every component name claimed by any collective, sorted unique.
    pub fn collective_members(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .collectives
            .values()
            .flat_map(|c| c.claimed())
            .collect();
        set.into_iter().collect()
    }

    /// The first collective (in name order) claiming the given
    /// component name.
    pub fn collective_claiming(&self, component_name: &str) -> Option<&Collective> {
        self.collectives
            .values()
            .find(|c| c.claimed().iter().any(|m| m == component_name))
    }

    pub fn working_component(&self, name: &str) -> Option<&Component> {
        self.working.get(name)
    }

    pub fn working_components(&self) -> impl Iterator<Item = &Component> {
        self.working.values()
    }

    /// Diagnostics accumulated during the last working-table
    /// derivation (provide cycles inside instance merges).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sorted unique behavior names across the working table.
    pub fn behavior_names(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .working
            .values()
            .flat_map(|c| c.names())
            .collect();
        set.into_iter().collect()
    }

    /// Every (componentName, behavior) pair providing the queried
    /// name, sorted by component name then behavior.
    pub fn behavior_providers(&self, behavior_name: &str) -> Vec<BehaviorProvider> {
        let mut ret = Vec::new();
        for (component_name, component) in &self.working {
            for behavior in component.provides(Some(behavior_name)) {
                ret.push(BehaviorProvider {
                    component_name: component_name.clone(),
                    behavior,
                });
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::Instance;

    fn provider(component: &str, behavior: Behavior) -> BehaviorProvider {
        BehaviorProvider {
            component_name: component.to_string(),
            behavior,
        }
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn adds_single_component() {
        let mut r = Registry::new();
        r.add_component(Component::new("simple"));
        assert_eq!(r.component_names(), strings(&["simple"]));
    }

    #[test]
    fn component_names_are_sorted() {
        let mut r = Registry::new();
        r.add_component(Component::new("cc"));
        r.add_component(Component::new("cb"));
        r.add_component(Component::new("ca"));
        assert_eq!(r.component_names(), strings(&["ca", "cb", "cc"]));
    }

    #[test]
    fn overlapping_variants_accumulate() {
        let mut r = Registry::new();
        r.add_component(Component::new("c").with_provides(vec![Behavior::new("ba")]));
        assert_eq!(r.component_variants("c").len(), 1);
        r.add_component(Component::new("c").with_provides(vec![Behavior::new("bb")]));
        assert_eq!(r.component_variants("c").len(), 2);
        assert_eq!(r.component_names(), strings(&["c"]));
        assert_eq!(r.behavior_names(), strings(&["ba", "bb"]));
    }

    #[test]
    fn identical_component_is_dropped() {
        let mut r = Registry::new();
        r.add_component(Component::new("c").with_provides(vec![Behavior::new("b")]));
        r.add_component(Component::new("c").with_provides(vec![Behavior::new("b")]));
        assert_eq!(r.component_variants("c").len(), 1);
        assert_eq!(r.component_names(), strings(&["c"]));
        assert_eq!(r.behavior_names(), strings(&["b"]));
    }

    #[test]
    fn unknown_queries_are_empty() {
        let r = Registry::new();
        assert!(r.component_variants("nope").is_empty());
        assert!(r.behavior_providers("nope").is_empty());
        assert!(r.collective_claiming("nope").is_none());
        assert!(r.working_component("nope").is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn adds_single_collective() {
        let mut r = Registry::new();
        r.add(Collective::new("l1").into());
        assert_eq!(r.collective_names(), strings(&["l1"]));
        assert!(r.collective_members().is_empty());
    }

    #[test]
    fn multiple_collectives() {
        let mut r = Registry::new();
        r.add(Collective::new("l1").with_member("c1").with_member("c2").into());
        r.add(Collective::new("l2").with_member("c3").with_member("c4").into());
        assert_eq!(r.collective_names(), strings(&["l1", "l2"]));
        assert_eq!(r.collective_members(), strings(&["c1", "c2", "c3", "c4"]));
    }

    #[test]
    fn collective_after_components_claims_members() {
        let mut r = Registry::new();
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b1")]).into());
        r.add(Component::new("c2").with_provides(vec![Behavior::new("b2")]).into());
        r.add(Component::new("c3").with_provides(vec![Behavior::new("b3")]).into());
        r.add(Collective::new("l1").with_member("c1").with_member("c2").into());
        assert_eq!(r.component_names(), strings(&["c3", "l1"]));
        assert_eq!(r.collective_claiming("c1").map(Collective::name), Some("l1"));
        assert!(r.collective_claiming("c3").is_none());
    }

    #[test]
    fn collective_between_components() {
        let mut r = Registry::new();
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b1")]).into());
        r.add(Collective::new("l1").with_member("c1").with_member("c2").into());
        assert_eq!(r.component_names(), strings(&["l1"]));
        r.add(Component::new("c2").with_provides(vec![Behavior::new("b2")]).into());
        assert_eq!(r.component_names(), strings(&["l1"]));
        r.add(Component::new("c3").with_provides(vec![Behavior::new("b3")]).into());
        assert_eq!(r.component_names(), strings(&["c3", "l1"]));
    }

    #[test]
    fn collective_folds_overlapping_variants() {
        let mut r = Registry::new();
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b1")]).into());
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b2")]).into());
        r.add(Collective::new("l1").with_member("c1").with_member("c2").into());
        assert_eq!(r.component_names(), strings(&["l1"]));
        assert_eq!(r.behavior_names(), strings(&["b1", "b2"]));
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b3")]).into());
        r.add(Component::new("c2").with_provides(vec![Behavior::new("b4")]).into());
        assert_eq!(r.behavior_names(), strings(&["b1", "b2", "b3", "b4"]));
    }

    #[test]
    fn collective_behavior_providers() {
        let mut r = Registry::new();
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b1")]).into());
        r.add(Component::new("c2").with_provides(vec![Behavior::new("b2")]).into());
        r.add(
            Component::new("c3")
                .with_provides(vec![Behavior::new("b3").with_conditions(strings(&["b2"]))])
                .into(),
        );
        r.add(Collective::new("l1").with_member("c3").into());
        assert_eq!(
            r.behavior_providers("b1"),
            vec![provider("c1", Behavior::new("b1"))],
        );
        assert_eq!(
            r.behavior_providers("b3"),
            vec![provider("l1", Behavior::new("b3").with_conditions(strings(&["b2"])))],
        );
    }

    #[test]
    fn providers_sort_by_component_then_behavior() {
        let mut r = Registry::new();
        r.add_component(Component::new("c6").with_provides(vec![Behavior::new("b56")]));
        r.add_component(Component::new("c5").with_provides(vec![Behavior::new("b56")]));
        r.add_component(Component::new("c7").with_provides(vec![
            Behavior::new("b7").with_conditions(strings(&["cond7b"])),
            Behavior::new("b7").with_conditions(strings(&["cond7a"])),
        ]));
        assert_eq!(
            r.behavior_providers("b56"),
            vec![
                provider("c5", Behavior::new("b56")),
                provider("c6", Behavior::new("b56")),
            ],
        );
        assert_eq!(
            r.behavior_providers("b7"),
            vec![
                provider("c7", Behavior::new("b7").with_conditions(strings(&["cond7a"]))),
                provider("c7", Behavior::new("b7").with_conditions(strings(&["cond7b"]))),
            ],
        );
    }

    fn instanced_registry() -> Registry {
        let mut r = Registry::new();
        r.add(
            Component::new("c1")
                .with_provides(vec![Behavior::new("b1").with_conditions(strings(&["b2"]))])
                .into(),
        );
        r.add(
            Component::new("c2")
                .with_provides(vec![
                    Behavior::new("b2").with_conditions(strings(&["b3", "b4", "b5"])),
                ])
                .into(),
        );
        r.add(Component::new("c3").with_provides(vec![Behavior::new("b3")]).into());
        r.add(
            Collective::new("l1")
                .with_instance(Instance {
                    name: "i1".to_string(),
                    comment: String::new(),
                    components: strings(&["c1", "c2", "c3", "c4"]),
                    provides_tag: "pt1".to_string(),
                    conditions_tag: "ct1".to_string(),
                })
                .with_instance(Instance {
                    name: "i2".to_string(),
                    comment: String::new(),
                    components: strings(&["c1", "c2", "c3", "c4"]),
                    provides_tag: "pt2".to_string(),
                    conditions_tag: "ct2".to_string(),
                })
                .into(),
        );
        // Arrive after the collective: the re-derivation folds them in.
        r.add(Component::new("c4").with_provides(vec![Behavior::new("b4")]).into());
        r.add(Component::new("c5").with_provides(vec![Behavior::new("b5 | ct1")]).into());
        r
    }

    #[test]
    fn instances_rewrite_behavior_names() {
        let r = instanced_registry();
        assert_eq!(
            r.behavior_names(),
            strings(&[
                "b1 | pt1", "b1 | pt2",
                "b2 | pt1", "b2 | pt2",
                "b3 | pt1", "b3 | pt2",
                "b4 | pt1", "b4 | pt2",
                "b5 | ct1", "b5 | ct2",
            ]),
        );
        assert!(r.diagnostics().is_empty());
    }

    #[test]
    fn instance_providers_reduce_internal_links() {
        let r = instanced_registry();
        assert_eq!(
            r.behavior_providers("b1 | pt1"),
            vec![provider(
                "i1",
                Behavior::new("b1 | pt1").with_conditions(strings(&["b5 | ct1"])),
            )],
        );
        assert_eq!(
            r.behavior_providers("b3 | pt1"),
            vec![provider("i1", Behavior::new("b3 | pt1"))],
        );
        assert_eq!(
            r.behavior_providers("b5 | ct1"),
            vec![provider("c5", Behavior::new("b5 | ct1"))],
        );
        assert_eq!(
            r.behavior_providers("b1 | pt2"),
            vec![provider(
                "i2",
                Behavior::new("b1 | pt2").with_conditions(strings(&["b5 | ct2"])),
            )],
        );
    }

    #[test]
    fn instance_merge_cycle_is_diagnosed() {
        let mut r = Registry::new();
        r.add(
            Component::new("c1")
                .with_provides(vec![Behavior::new("b1").with_conditions(strings(&["b2"]))])
                .into(),
        );
        r.add(
            Component::new("c2")
                .with_provides(vec![Behavior::new("b2").with_conditions(strings(&["b1"]))])
                .into(),
        );
        r.add(
            Collective::new("l1")
                .with_instance(Instance {
                    name: "i1".to_string(),
                    comment: String::new(),
                    components: strings(&["c1", "c2"]),
                    provides_tag: "pt1".to_string(),
                    conditions_tag: "ct1".to_string(),
                })
                .into(),
        );
        assert!(!r.diagnostics().is_empty());
        assert!(
            r.diagnostics()
                .iter()
                .all(|d| d.failure_class == crate::diagnostic::failure_class::PROVIDE_CYCLE)
        );
    }

    #[test]
    fn replacing_a_collective_releases_members() {
        let mut r = Registry::new();
        r.add(Component::new("c1").with_provides(vec![Behavior::new("b1")]).into());
        r.add(Component::new("c2").with_provides(vec![Behavior::new("b2")]).into());
        r.add(Collective::new("l1").with_member("c1").with_member("c2").into());
        assert_eq!(r.component_names(), strings(&["l1"]));
        r.add(Collective::new("l1").with_member("c1").into());
        assert_eq!(r.component_names(), strings(&["c2", "l1"]));
    }
}
