//! Document encoding and decoding for [`ProjectGraph`].
//!
//! Writing is canonical: dictionary keys are emitted sorted, so
//! serialize ∘ deserialize ∘ serialize is byte-identical. Reading hydrates
//! only what the root object reaches; entries in `objects` that nothing
//! references are dropped (their uuids remain reserved in the registry).
//! Loaded nodes carry exactly the attributes the document spelled out,
//! with no schema defaults filled in.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use pbx_plist::{self, Dictionary, Value};
use pbx_schema::{AttrClass, SchemaTable};
use pbx_types::{AttrValue, Uuid};

use crate::error::{LoadError, LoadResult};
use crate::graph::ProjectGraph;
use crate::node::Node;
use crate::registry::UuidRegistry;

const KEY_ARCHIVE_VERSION: &str = "archiveVersion";
const KEY_CLASSES: &str = "classes";
const KEY_OBJECT_VERSION: &str = "objectVersion";
const KEY_OBJECTS: &str = "objects";
const KEY_ROOT_OBJECT: &str = "rootObject";
const KEY_ISA: &str = "isa";

impl ProjectGraph {
    /// Encode the graph as a complete project document.
    pub fn to_pbxproj_string(&self) -> String {
        let mut objects = Dictionary::new();
        for node in self.nodes() {
            let mut dict = Dictionary::new();
            dict.insert(KEY_ISA.to_string(), Value::string(node.kind()));
            for (attr, value) in node.attributes() {
                dict.insert(attr.to_string(), encode_attr(value));
            }
            objects.insert(node.uuid().as_str().to_string(), Value::Dict(dict));
        }

        let mut top = Dictionary::new();
        top.insert(
            KEY_ARCHIVE_VERSION.to_string(),
            Value::string(&self.archive_version),
        );
        top.insert(KEY_CLASSES.to_string(), Value::Dict(self.classes.clone()));
        top.insert(
            KEY_OBJECT_VERSION.to_string(),
            Value::string(&self.object_version),
        );
        top.insert(KEY_OBJECTS.to_string(), Value::Dict(objects));
        top.insert(
            KEY_ROOT_OBJECT.to_string(),
            Value::string(self.root().as_str()),
        );
        pbx_plist::write_document(&Value::Dict(top))
    }

    /// Decode a project document.
    ///
    /// Rejects text carrying version-control merge-conflict markers before
    /// parsing, so a conflicted file never round-trips into a half-merged
    /// graph.
    pub fn from_pbxproj_str(schema: Arc<SchemaTable>, text: &str) -> LoadResult<Self> {
        if pbx_plist::contains_merge_conflicts(text) {
            return Err(LoadError::MergeConflict);
        }
        let document = pbx_plist::parse_document(text)?;
        let top = document
            .as_dict()
            .ok_or_else(|| LoadError::Malformed("top-level value is not a dictionary".into()))?;

        let archive_version = header_field(top, KEY_ARCHIVE_VERSION)?
            .unwrap_or(crate::graph::LAST_KNOWN_ARCHIVE_VERSION)
            .to_string();
        let object_version = header_field(top, KEY_OBJECT_VERSION)?
            .unwrap_or(crate::graph::DEFAULT_OBJECT_VERSION)
            .to_string();
        let classes = match top.get(KEY_CLASSES) {
            None => Dictionary::new(),
            Some(Value::Dict(d)) => d.clone(),
            Some(_) => {
                return Err(LoadError::Malformed(format!(
                    "`{KEY_CLASSES}` is not a dictionary"
                )));
            }
        };
        let objects = match top.get(KEY_OBJECTS) {
            Some(Value::Dict(d)) => d,
            Some(_) => {
                return Err(LoadError::Malformed(format!(
                    "`{KEY_OBJECTS}` is not a dictionary"
                )));
            }
            None => {
                return Err(LoadError::Malformed(format!(
                    "missing `{KEY_OBJECTS}` dictionary"
                )));
            }
        };
        let root = match top.get(KEY_ROOT_OBJECT) {
            Some(Value::String(s)) => Uuid::parse(s)?,
            Some(_) => {
                return Err(LoadError::Malformed(format!(
                    "`{KEY_ROOT_OBJECT}` is not a string"
                )));
            }
            None => {
                return Err(LoadError::Malformed(format!(
                    "missing `{KEY_ROOT_OBJECT}` identifier"
                )));
            }
        };

        // Reserve every identifier the document mentions, hydrated or not,
        // so later generation cannot collide with a dropped entry.
        let mut registry = UuidRegistry::new();
        for key in objects.keys() {
            registry.record(&Uuid::parse(key)?);
        }

        let mut graph = ProjectGraph {
            schema: Arc::clone(&schema),
            registry,
            root: root.clone(),
            nodes: HashMap::new(),
            order: Vec::new(),
            detached: HashMap::new(),
            referrers: HashMap::new(),
            archive_version,
            object_version,
            classes,
        };
        graph.hydrate(objects, root)?;
        debug!(
            objects = graph.len(),
            dropped = objects.len() - graph.len(),
            "loaded project document"
        );
        Ok(graph)
    }

    /// Breadth-first hydration from the root object. Every reference the
    /// schema recognizes must resolve within `objects`.
    fn hydrate(&mut self, objects: &Dictionary, root: Uuid) -> LoadResult<()> {
        let schema = Arc::clone(&self.schema);
        let mut queue = vec![root.clone()];
        while let Some(uuid) = queue.pop() {
            if self.nodes.contains_key(&uuid) {
                continue;
            }
            let entry = objects
                .get(uuid.as_str())
                .and_then(Value::as_dict)
                .ok_or_else(|| {
                    LoadError::Malformed(format!("object `{uuid}` is not a dictionary"))
                })?;
            let kind = entry
                .get(KEY_ISA)
                .and_then(Value::as_str)
                .ok_or_else(|| LoadError::Malformed(format!("object `{uuid}` has no isa")))?;
            let object_schema = schema.get(kind).ok_or_else(|| LoadError::UnknownKind {
                uuid: uuid.clone(),
                kind: kind.to_string(),
            })?;

            let mut node = Node::new(uuid.clone(), kind);
            for (attr, value) in entry {
                if attr == KEY_ISA {
                    continue;
                }
                let decoded = match object_schema.classify(attr) {
                    AttrClass::Reference => {
                        let target = decode_target(&uuid, attr, value, objects)?;
                        queue.push(target.clone());
                        AttrValue::Ref(target)
                    }
                    AttrClass::ReferenceList => {
                        let items = value.as_array().ok_or_else(|| {
                            LoadError::Malformed(format!(
                                "`{attr}` of `{uuid}` is not an array"
                            ))
                        })?;
                        let mut targets = Vec::with_capacity(items.len());
                        for item in items {
                            let target = decode_target(&uuid, attr, item, objects)?;
                            queue.push(target.clone());
                            targets.push(target);
                        }
                        AttrValue::Refs(targets)
                    }
                    AttrClass::Scalar => decode_data(value),
                };
                node.attributes.insert(attr.to_string(), decoded);
            }

            let edges: Vec<(String, Uuid)> = node
                .outgoing()
                .into_iter()
                .map(|(a, t)| (a.to_string(), t.clone()))
                .collect();
            self.nodes.insert(uuid.clone(), node);
            self.order.push(uuid.clone());
            for (attr, target) in edges {
                self.referrers
                    .entry(target)
                    .or_default()
                    .insert((uuid.clone(), attr));
            }
        }
        if !self.nodes.contains_key(&self.root) {
            return Err(LoadError::Malformed(format!(
                "root object `{}` not found in `{KEY_OBJECTS}`",
                self.root
            )));
        }
        Ok(())
    }
}

fn header_field<'a>(top: &'a Dictionary, key: &str) -> LoadResult<Option<&'a str>> {
    match top.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(LoadError::Malformed(format!("`{key}` is not a string"))),
    }
}

fn decode_target(
    referrer: &Uuid,
    attr: &str,
    value: &Value,
    objects: &Dictionary,
) -> LoadResult<Uuid> {
    let raw = value.as_str().ok_or_else(|| {
        LoadError::Malformed(format!("`{attr}` of `{referrer}` is not an identifier"))
    })?;
    let target = Uuid::parse(raw)?;
    if !objects.contains_key(target.as_str()) {
        return Err(LoadError::DanglingReference {
            referrer: referrer.clone(),
            attr: attr.to_string(),
            target,
        });
    }
    Ok(target)
}

fn decode_data(value: &Value) -> AttrValue {
    match value {
        Value::String(s) => AttrValue::Scalar(s.clone()),
        Value::Array(items) => AttrValue::List(items.iter().map(decode_data).collect()),
        Value::Dict(dict) => AttrValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), decode_data(v)))
                .collect(),
        ),
    }
}

fn encode_attr(value: &AttrValue) -> Value {
    match value {
        AttrValue::Scalar(s) => Value::String(s.clone()),
        AttrValue::List(items) => Value::Array(items.iter().map(encode_attr).collect()),
        AttrValue::Dict(dict) => Value::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), encode_attr(v)))
                .collect(),
        ),
        AttrValue::Ref(uuid) => Value::string(uuid.as_str()),
        AttrValue::Refs(uuids) => {
            Value::Array(uuids.iter().map(|u| Value::string(u.as_str())).collect())
        }
    }
}
