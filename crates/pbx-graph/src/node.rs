//! One typed object of the project graph.

use std::collections::BTreeMap;

use pbx_schema::SchemaTable;
use pbx_types::{AttrValue, Uuid};

/// A node of the project graph: an identifier, a kind tag selecting the
/// attribute schema, and the attribute map.
///
/// Nodes do not know the graph they belong to; edges, registration, and the
/// reverse-reference index are owned by
/// [`ProjectGraph`](crate::graph::ProjectGraph).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) uuid: Uuid,
    pub(crate) kind: String,
    /// Attribute map with canonical key ordering.
    pub(crate) attributes: BTreeMap<String, AttrValue>,
}

impl Node {
    pub(crate) fn new(uuid: Uuid, kind: impl Into<String>) -> Self {
        Self {
            uuid,
            kind: kind.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// This node's identifier.
    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    /// The kind tag (the `isa` value in the document).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up an attribute value.
    pub fn get(&self, attr: &str) -> Option<&AttrValue> {
        self.attributes.get(attr)
    }

    /// The scalar string value of an attribute, if it is a scalar.
    pub fn scalar(&self, attr: &str) -> Option<&str> {
        self.get(attr).and_then(AttrValue::as_scalar)
    }

    /// All attributes in canonical (sorted) order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every outgoing reference edge as `(attribute, target)`, attributes in
    /// canonical order, list targets in list order.
    pub fn outgoing(&self) -> Vec<(&str, &Uuid)> {
        let mut edges = Vec::new();
        for (attr, value) in &self.attributes {
            for target in value.references() {
                edges.push((attr.as_str(), target));
            }
        }
        edges
    }

    /// The display name: the first schema-designated display attribute with a
    /// scalar value, falling back to the kind tag.
    pub fn display_name(&self, schema: &SchemaTable) -> String {
        if let Some(object_schema) = schema.get(&self.kind) {
            for key in object_schema.display_key_candidates() {
                if let Some(name) = self.scalar(key) {
                    return name.to_string();
                }
            }
        }
        self.kind.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_schema::builtin;

    fn uuid(s: &str) -> Uuid {
        Uuid::from_static(s)
    }

    #[test]
    fn outgoing_collects_all_edges_in_order() {
        let mut node = Node::new(uuid("AA"), "PBXNativeTarget");
        node.attributes.insert(
            "buildPhases".into(),
            AttrValue::Refs(vec![uuid("P1"), uuid("P2")]),
        );
        node.attributes
            .insert("buildConfigurationList".into(), AttrValue::Ref(uuid("CL")));
        node.attributes
            .insert("name".into(), AttrValue::scalar("App"));

        let edges = node.outgoing();
        assert_eq!(
            edges,
            vec![
                ("buildConfigurationList", &uuid("CL")),
                ("buildPhases", &uuid("P1")),
                ("buildPhases", &uuid("P2")),
            ]
        );
    }

    #[test]
    fn display_name_prefers_name_over_path() {
        let schema = builtin::standard();
        let mut node = Node::new(uuid("AA"), "PBXFileReference");
        node.attributes
            .insert("path".into(), AttrValue::scalar("Classes/Test.h"));
        assert_eq!(node.display_name(&schema), "Classes/Test.h");

        node.attributes
            .insert("name".into(), AttrValue::scalar("Test.h"));
        assert_eq!(node.display_name(&schema), "Test.h");
    }

    #[test]
    fn display_name_falls_back_to_kind() {
        let schema = builtin::standard();
        let node = Node::new(uuid("AA"), "PBXSourcesBuildPhase");
        assert_eq!(node.display_name(&schema), "PBXSourcesBuildPhase");
    }
}
