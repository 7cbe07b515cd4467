//! # Pact Graph
//!
//! Promise-network graph data for force-directed rendering: every
//! working component, the behaviors it wants, the components offering
//! them, and the condition edges in between, each node and link
//! carrying a satisfaction flag.
//!
//! This crate only builds the data; layout and drawing belong to the
//! consumer.

use pact_kernel::{Offer, Registry, Resolution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Component,
    Behavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Component → behavior it wants.
    Wants,
    /// Behavior → component offering it.
    Provides,
    /// Component → condition behavior its offer depends on.
    Needs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub satisfied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub satisfied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Accumulates nodes and links in first-seen order, deduplicated by
/// id and by (source, target, type).
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    index: BTreeMap<String, usize>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    fn node(&mut self, id: &str, node_type: NodeType) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(GraphNode {
            id: id.to_string(),
            label: id.to_string(),
            node_type,
            satisfied: true,
        });
        self.index.insert(id.to_string(), idx);
        idx
    }

    fn mark_unsatisfied(&mut self, id: &str) {
        if let Some(&idx) = self.index.get(id) {
            self.nodes[idx].satisfied = false;
        }
    }

    fn find_link(&self, source: &str, target: &str, link_type: LinkType) -> Option<usize> {
        self.links.iter().position(|link| {
            link.source == source && link.target == target && link.link_type == link_type
        })
    }

    /// Add the link if new; otherwise overwrite its satisfied flag.
    fn link(&mut self, source: &str, target: &str, link_type: LinkType, satisfied: bool) {
        match self.find_link(source, target, link_type) {
            Some(idx) => self.links[idx].satisfied = satisfied,
            None => self.links.push(GraphLink {
                source: source.to_string(),
                target: target.to_string(),
                link_type,
                satisfied,
            }),
        }
    }

    /// Keep an existing link's flag; only add when absent.
    fn link_if_absent(&mut self, source: &str, target: &str, link_type: LinkType, satisfied: bool) {
        if self.find_link(source, target, link_type).is_none() {
            self.links.push(GraphLink {
                source: source.to_string(),
                target: target.to_string(),
                link_type,
                satisfied,
            });
        }
    }

    fn walk_resolution(&mut self, behavior_name: &str, resolution: &Resolution) {
        for offer in resolution.satisfied() {
            self.walk_offer(behavior_name, offer, true);
        }
        for offer in resolution.unsatisfied() {
            self.walk_offer(behavior_name, offer, false);
        }
        if !resolution.is_satisfied() {
            self.mark_unsatisfied(behavior_name);
        }
    }

    fn walk_offer(&mut self, behavior_name: &str, offer: &Offer, holds: bool) {
        let provider = offer.component();
        self.node(provider, NodeType::Component);
        self.link_if_absent(behavior_name, provider, LinkType::Provides, holds);

        for condition in offer.conditions() {
            let condition_name = condition.behavior();
            self.node(condition_name, NodeType::Behavior);
            self.link(provider, condition_name, LinkType::Needs, condition.is_satisfied());
            self.walk_resolution(condition_name, condition);
        }
    }

    fn build(self) -> GraphData {
        GraphData {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

/// Build the promise network for every working component's wants.
///
/// The walk follows the pruned resolution, so competing providers on
/// the losing side of a settled behavior do not appear. Output order
/// is fixed by the registry's working-table order, so an unchanged
/// registry always yields an identical graph.
pub fn network_graph(registry: &Registry) -> GraphData {
    if registry.is_empty() {
        return GraphData::new();
    }

    let mut builder = GraphBuilder::new();
    for component in registry.working_components() {
        builder.node(component.name(), NodeType::Component);

        for want in component.wants(None) {
            builder.node(want.name(), NodeType::Behavior);

            let resolution = registry.resolve(want.name());
            builder.link(
                component.name(),
                want.name(),
                LinkType::Wants,
                resolution.is_satisfied(),
            );
            if !resolution.is_satisfied() {
                builder.mark_unsatisfied(want.name());
            }
            builder.walk_resolution(want.name(), &resolution);
        }
    }
    builder.build()
}
