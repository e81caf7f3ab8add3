//! Canonical mapping produced by the legacy decoder
//!
//! Section name (uppercase) to insertion-indexed instances, each instance a
//! map from lowercase directive keyword to [`Value`]. The cross-section
//! order of appearance is recorded separately so the emitter can reproduce
//! it; it does not take part in equality of the serialized form.

pub mod value;

pub use value::{Directives, Value};

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

pub type SectionInstances = BTreeMap<usize, Directives>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputMapping {
    sections: BTreeMap<String, SectionInstances>,
    order: Vec<(String, usize)>,
}

impl InputMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section instance under the next monotonic index
    pub fn push_section(&mut self, name: &str, directives: Directives) -> usize {
        let name = name.to_ascii_uppercase();
        let instances = self.sections.entry(name.clone()).or_default();
        let index = instances.len();
        instances.insert(index, directives);
        self.order.push((name, index));
        index
    }

    pub fn section(&self, name: &str) -> Option<&SectionInstances> {
        self.sections.get(&name.to_ascii_uppercase())
    }

    pub fn get(&self, name: &str, index: usize) -> Option<&Directives> {
        self.section(name).and_then(|instances| instances.get(&index))
    }

    pub fn section_count(&self, name: &str) -> usize {
        self.section(name).map_or(0, |instances| instances.len())
    }

    /// Number of section instances across every kind
    pub fn total_sections(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section instances in the order they were decoded
    pub fn iter_in_order(&self) -> impl Iterator<Item = (&str, usize, &Directives)> {
        self.order.iter().filter_map(move |(name, index)| {
            self.get(name, *index)
                .map(|directives| (name.as_str(), *index, directives))
        })
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for InputMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (name, instances) in &self.sections {
            map.serialize_entry(name, instances)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_instance(path: &str) -> Directives {
        let mut formats = BTreeMap::new();
        formats.insert("pqr".to_string(), Value::List(vec![Value::from(path)]));
        let mut directives = Directives::new();
        directives.insert("mol".to_string(), Value::Record(formats));
        directives
    }

    #[test]
    fn test_sections_get_monotonic_indices() {
        let mut mapping = InputMapping::new();
        assert_eq!(mapping.push_section("read", read_instance("a.pqr")), 0);
        assert_eq!(mapping.push_section("READ", read_instance("b.pqr")), 1);
        assert_eq!(mapping.section_count("READ"), 2);
        assert!(mapping.get("READ", 1).is_some());
    }

    #[test]
    fn test_order_is_preserved_across_kinds() {
        let mut mapping = InputMapping::new();
        mapping.push_section("ELEC", Directives::new());
        mapping.push_section("READ", read_instance("a.pqr"));
        mapping.push_section("ELEC", Directives::new());
        let order: Vec<(&str, usize)> = mapping.iter_in_order().map(|(n, i, _)| (n, i)).collect();
        assert_eq!(order, vec![("ELEC", 0), ("READ", 0), ("ELEC", 1)]);
    }

    #[test]
    fn test_json_serialization() {
        let mut mapping = InputMapping::new();
        mapping.push_section("READ", read_instance("Mol1.pqr"));
        let json = mapping.to_json().unwrap();
        assert_eq!(
            json,
            serde_json::json!({"READ": {"0": {"mol": {"pqr": ["Mol1.pqr"]}}}})
        );
        let pretty: serde_json::Value =
            serde_json::from_str(&mapping.to_json_pretty().unwrap()).unwrap();
        assert_eq!(pretty, json);
    }
}
