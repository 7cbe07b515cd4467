//! Collective: a named grouping of components, merged flatly or split
//! into tagged instances, plus the record union the registry ingests.

use crate::component::Component;
use serde::{Deserialize, Serialize};

/// One instance of a collective: a synthetic component built from a
/// chosen member subset, with disambiguating name tags so multiple
/// instances of one template coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    pub provides_tag: String,
    pub conditions_tag: String,
}

/// A named grouping of components.
///
/// Either a flat member list (folded into one aggregate working
/// component under the collective's name) or a list of instances
/// (each folded into its own tagged working component).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Collective {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    comment: String,
    #[serde(rename = "components", default, skip_serializing_if = "Vec::is_empty")]
    members: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    instances: Vec<Instance>,
}

impl Collective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            members: Vec::new(),
            instances: Vec::new(),
        }
    }

    pub fn with_member(mut self, member: &str) -> Self {
        if !self.members.iter().any(|m| m == member) {
            self.members.push(member.to_string());
        }
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        if !self.instances.iter().any(|i| i.name == instance.name) {
            self.instances.push(instance);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Every component name this collective claims, flat members and
    /// instance members alike, in declaration order with duplicates
    /// removed.
    pub fn claimed(&self) -> Vec<String> {
        let mut ret: Vec<String> = Vec::new();
        let listed = self
            .members
            .iter()
            .chain(self.instances.iter().flat_map(|i| i.components.iter()));
        for name in listed {
            if !ret.contains(name) {
                ret.push(name.clone());
            }
        }
        ret
    }
}

/// An input record: the construction-time sum the registry dispatches
/// on. Wire documents carry a `kind` discriminator defaulting to
/// `Component` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Record {
    Component(Component),
    Collective(Collective),
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let mut value = serde_json::Value::deserialize(deserializer)?;
        let kind = value
            .as_object_mut()
            .and_then(|obj| obj.remove("kind"))
            .and_then(|k| k.as_str().map(String::from))
            .unwrap_or_else(|| "Component".to_string());
        match kind.as_str() {
            "Component" => serde_json::from_value(value)
                .map(Record::Component)
                .map_err(D::Error::custom),
            "Collective" => serde_json::from_value(value)
                .map(Record::Collective)
                .map_err(D::Error::custom),
            other => Err(D::Error::unknown_variant(
                other,
                &["Component", "Collective"],
            )),
        }
    }
}

impl Record {
    pub fn name(&self) -> &str {
        match self {
            Record::Component(c) => c.name(),
            Record::Collective(c) => c.name(),
        }
    }
}

impl From<Component> for Record {
    fn from(c: Component) -> Self {
        Record::Component(c)
    }
}

impl From<Collective> for Record {
    fn from(c: Collective) -> Self {
        Record::Collective(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;

    #[test]
    fn collective_builder_dedups() {
        let c = Collective::new("l1")
            .with_member("c1")
            .with_member("c2")
            .with_member("c1");
        assert_eq!(c.members(), ["c1", "c2"]);
        assert_eq!(c.claimed(), ["c1", "c2"]);
    }

    #[test]
    fn claimed_spans_members_and_instances() {
        let c = Collective::new("l1").with_member("c1").with_instance(Instance {
            name: "i1".to_string(),
            comment: String::new(),
            components: vec!["c1".to_string(), "c2".to_string()],
            provides_tag: "pt1".to_string(),
            conditions_tag: "ct1".to_string(),
        });
        assert_eq!(c.claimed(), ["c1", "c2"]);
    }

    #[test]
    fn instance_wire_shape() {
        let c: Collective = serde_json::from_value(serde_json::json!({
            "name": "l1",
            "instances": [{
                "name": "i1",
                "components": ["c1", "c2"],
                "providesTag": "pt1",
                "conditionsTag": "ct1",
            }],
        }))
        .unwrap();
        assert_eq!(c.instances()[0].name, "i1");
        assert_eq!(c.instances()[0].provides_tag, "pt1");
        assert_eq!(c.instances()[0].conditions_tag, "ct1");
    }

    #[test]
    fn record_kind_defaults_to_component() {
        let r: Record = serde_json::from_value(serde_json::json!({
            "name": "c1",
            "wants": [{"name": "b1"}],
        }))
        .unwrap();
        assert!(matches!(r, Record::Component(_)));

        let err = serde_json::from_value::<Record>(serde_json::json!({
            "kind": "Widget",
            "name": "c1",
        }));
        assert!(err.is_err());
    }

    #[test]
    fn record_kind_dispatch() {
        let r: Record = serde_json::from_value(serde_json::json!({
            "kind": "Collective",
            "name": "l1",
            "components": ["c1"],
        }))
        .unwrap();
        assert_eq!(r.name(), "l1");
        assert!(matches!(r, Record::Collective(_)));

        let r: Record = serde_json::from_value(serde_json::json!({
            "kind": "Component",
            "name": "c1",
            "provides": [{"name": "b1"}],
        }))
        .unwrap();
        match r {
            Record::Component(c) => assert_eq!(c.provides(None), vec![Behavior::new("b1")]),
            Record::Collective(_) => panic!("expected a component"),
        }
    }
}
