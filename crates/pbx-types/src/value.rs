use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::uuid::Uuid;

/// An attribute value of a project object.
///
/// References to other objects only ever appear directly under an attribute
/// (as [`AttrValue::Ref`] or [`AttrValue::Refs`]); the values nested inside
/// lists and dicts are plain data. Dict-shaped values (`buildSettings`,
/// project `attributes`, the `projectReferences` entries) are carried
/// structurally but the graph never interprets their contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A scalar string.
    Scalar(String),
    /// An ordered list of non-reference values.
    List(Vec<AttrValue>),
    /// A nested dictionary of non-reference values.
    Dict(BTreeMap<String, AttrValue>),
    /// A reference to another object.
    Ref(Uuid),
    /// An ordered list of references to other objects.
    Refs(Vec<Uuid>),
}

impl AttrValue {
    /// Convenience constructor for a scalar value.
    pub fn scalar(s: impl Into<String>) -> Self {
        AttrValue::Scalar(s.into())
    }

    /// The scalar string, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            AttrValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The referenced uuid, if this is a single reference.
    pub fn as_ref_uuid(&self) -> Option<&Uuid> {
        match self {
            AttrValue::Ref(u) => Some(u),
            _ => None,
        }
    }

    /// The referenced uuids, if this is a reference list.
    pub fn as_ref_list(&self) -> Option<&[Uuid]> {
        match self {
            AttrValue::Refs(list) => Some(list),
            _ => None,
        }
    }

    /// All uuids this value refers to, in order.
    ///
    /// Scalars, lists, and dicts hold no references by construction.
    pub fn references(&self) -> Vec<&Uuid> {
        match self {
            AttrValue::Ref(u) => vec![u],
            AttrValue::Refs(list) => list.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Returns `true` if this value refers to `uuid`.
    pub fn refers_to(&self, uuid: &Uuid) -> bool {
        match self {
            AttrValue::Ref(u) => u == uuid,
            AttrValue::Refs(list) => list.contains(uuid),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(s: &str) -> Uuid {
        Uuid::from_static(s)
    }

    #[test]
    fn scalar_has_no_references() {
        let v = AttrValue::scalar("SOURCE_ROOT");
        assert!(v.references().is_empty());
        assert_eq!(v.as_scalar(), Some("SOURCE_ROOT"));
    }

    #[test]
    fn ref_reports_single_reference() {
        let v = AttrValue::Ref(uuid("AA"));
        assert_eq!(v.references(), vec![&uuid("AA")]);
        assert!(v.refers_to(&uuid("AA")));
        assert!(!v.refers_to(&uuid("BB")));
    }

    #[test]
    fn ref_list_reports_all_in_order() {
        let v = AttrValue::Refs(vec![uuid("AA"), uuid("BB")]);
        assert_eq!(v.references(), vec![&uuid("AA"), &uuid("BB")]);
    }

    #[test]
    fn nested_structures_hold_no_references() {
        let mut settings = BTreeMap::new();
        settings.insert("PRODUCT_NAME".to_string(), AttrValue::scalar("AA"));
        let v = AttrValue::Dict(settings);
        // "AA" inside a dict is plain data, not an edge.
        assert!(v.references().is_empty());
        assert!(!v.refers_to(&uuid("AA")));
    }
}
