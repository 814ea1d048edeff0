//! Schema lookup table: an immutable, per-kind description of attributes.

use std::collections::HashMap;

use pbx_types::AttrValue;

/// Classification of a single attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrClass {
    /// Plain data: a scalar string, or a list/dict of plain data.
    Scalar,
    /// A single reference to another object.
    Reference,
    /// An ordered list of references to other objects.
    ReferenceList,
}

/// The schema of one object kind.
#[derive(Clone, Debug)]
pub struct ObjectSchema {
    kind: String,
    defaults: Vec<(String, AttrValue)>,
    classes: HashMap<String, AttrClass>,
    display_keys: Vec<String>,
    sorted_lists: Vec<String>,
    owned_link: bool,
}

impl ObjectSchema {
    /// Start a schema for `kind` with no attributes described.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            defaults: Vec::new(),
            classes: HashMap::new(),
            display_keys: Vec::new(),
            sorted_lists: Vec::new(),
            owned_link: false,
        }
    }

    /// Add a default attribute value, applied by `create` (never by load).
    pub fn default_attr(mut self, name: &str, value: AttrValue) -> Self {
        self.defaults.push((name.to_string(), value));
        self
    }

    /// Mark an attribute as a single reference.
    pub fn reference(mut self, name: &str) -> Self {
        self.classes.insert(name.to_string(), AttrClass::Reference);
        self
    }

    /// Mark an attribute as a reference list.
    pub fn reference_list(mut self, name: &str) -> Self {
        self.classes
            .insert(name.to_string(), AttrClass::ReferenceList);
        self
    }

    /// Designate the attributes consulted, in order, for the display name.
    pub fn display_keys(mut self, keys: &[&str]) -> Self {
        self.display_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Designate a reference-list attribute that `sort` reorders by display
    /// name.
    pub fn sorted_list(mut self, name: &str) -> Self {
        self.sorted_lists.push(name.to_string());
        self
    }

    /// Mark this kind as an exclusively-owned link object: an instance exists
    /// only to point at some other object, and removing that object removes
    /// the link object too.
    pub fn owned_link(mut self) -> Self {
        self.owned_link = true;
        self
    }

    /// The kind tag this schema describes.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Classify an attribute by name. Unlisted attributes are plain data.
    pub fn classify(&self, attr: &str) -> AttrClass {
        self.classes.get(attr).copied().unwrap_or(AttrClass::Scalar)
    }

    /// Default attribute values in declaration order.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.defaults.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attributes consulted for the display name, most specific first.
    pub fn display_key_candidates(&self) -> &[String] {
        &self.display_keys
    }

    /// Reference-list attributes that `sort` reorders.
    pub fn sorted_lists(&self) -> &[String] {
        &self.sorted_lists
    }

    /// Whether this kind is an exclusively-owned link object.
    pub fn is_owned_link(&self) -> bool {
        self.owned_link
    }
}

/// Immutable lookup table from kind tag to schema.
///
/// Built once at startup and shared by the graph, the serializer, and the
/// snapshot builder.
#[derive(Clone, Debug)]
pub struct SchemaTable {
    by_kind: HashMap<String, ObjectSchema>,
}

impl SchemaTable {
    /// Build a table from a set of schemas.
    pub fn new(schemas: impl IntoIterator<Item = ObjectSchema>) -> Self {
        let by_kind = schemas
            .into_iter()
            .map(|s| (s.kind.clone(), s))
            .collect();
        Self { by_kind }
    }

    /// Look up the schema for a kind tag.
    pub fn get(&self, kind: &str) -> Option<&ObjectSchema> {
        self.by_kind.get(kind)
    }

    /// Returns `true` if the table describes `kind`.
    pub fn knows(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// All known kind tags, unordered.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.by_kind.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlisted_attributes_are_scalar() {
        let schema = ObjectSchema::new("PBXGroup").reference_list("children");
        assert_eq!(schema.classify("children"), AttrClass::ReferenceList);
        assert_eq!(schema.classify("sourceTree"), AttrClass::Scalar);
    }

    #[test]
    fn defaults_preserve_declaration_order() {
        let schema = ObjectSchema::new("PBXFileReference")
            .default_attr("sourceTree", AttrValue::scalar("SOURCE_ROOT"))
            .default_attr("includeInIndex", AttrValue::scalar("1"));
        let names: Vec<&str> = schema.defaults().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["sourceTree", "includeInIndex"]);
    }

    #[test]
    fn table_lookup() {
        let table = SchemaTable::new([
            ObjectSchema::new("PBXGroup"),
            ObjectSchema::new("PBXProject"),
        ]);
        assert!(table.knows("PBXGroup"));
        assert!(!table.knows("PBXNativeTarget"));
        assert_eq!(table.get("PBXProject").unwrap().kind(), "PBXProject");
    }
}
