//! The project object graph: registration, reference tracking, mutation.
//!
//! [`ProjectGraph`] stores nodes in a [`HashMap`] keyed by uuid, with a
//! separate attachment-order list for stable iteration and a reverse-reference
//! index (target → set of `(referrer, attribute)` pairs) maintained
//! incrementally on every edge change.
//!
//! # Invariants
//!
//! - No two nodes share a uuid; uuids are never reissued within an instance.
//! - A node is registered **iff** it is reachable from the root (or is the
//!   root itself). Detached nodes live in a side table until first
//!   referenced.
//! - No registered attribute references an unregistered uuid, except inside
//!   a single mutation call.
//! - Reference edges may form cycles; every traversal carries a visited set.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use pbx_plist::Dictionary;
use pbx_schema::SchemaTable;
use pbx_types::{AttrValue, Uuid};

use crate::error::{GraphError, GraphResult};
use crate::node::Node;
use crate::registry::UuidRegistry;

/// Kind tag of the root object.
pub const PROJECT_KIND: &str = "PBXProject";

/// Archive version written for new projects.
pub const LAST_KNOWN_ARCHIVE_VERSION: &str = "1";

/// Object version written for new projects.
pub const DEFAULT_OBJECT_VERSION: &str = "46";

/// An in-memory project: the object graph plus the document header fields.
#[derive(Debug)]
pub struct ProjectGraph {
    pub(crate) schema: Arc<SchemaTable>,
    pub(crate) registry: UuidRegistry,
    pub(crate) root: Uuid,
    /// Registered (root-reachable) nodes.
    pub(crate) nodes: HashMap<Uuid, Node>,
    /// Attachment order of the registered nodes.
    pub(crate) order: Vec<Uuid>,
    /// Created-but-unreferenced nodes; uuid already reserved.
    pub(crate) detached: HashMap<Uuid, Node>,
    /// Reverse-reference index: target → set of (referrer, attribute).
    pub(crate) referrers: HashMap<Uuid, BTreeSet<(Uuid, String)>>,
    pub(crate) archive_version: String,
    pub(crate) object_version: String,
    pub(crate) classes: Dictionary,
}

impl ProjectGraph {
    /// Create an empty project: a root `PBXProject` node with its schema
    /// defaults, and nothing else.
    pub fn new(schema: Arc<SchemaTable>) -> GraphResult<Self> {
        Self::with_registry(schema, UuidRegistry::new())
    }

    /// Like [`new`](Self::new) with a fixed identifier seed, for
    /// reproducible tests.
    pub fn with_seed(schema: Arc<SchemaTable>, seed: u64) -> GraphResult<Self> {
        Self::with_registry(schema, UuidRegistry::with_seed(seed))
    }

    fn with_registry(schema: Arc<SchemaTable>, mut registry: UuidRegistry) -> GraphResult<Self> {
        let project_schema = schema
            .get(PROJECT_KIND)
            .ok_or_else(|| GraphError::UnknownKind(PROJECT_KIND.to_string()))?;

        let root = registry.generate();
        let mut root_node = Node::new(root.clone(), PROJECT_KIND);
        for (attr, value) in project_schema.defaults() {
            root_node.attributes.insert(attr.to_string(), value.clone());
        }

        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), root_node);
        Ok(Self {
            schema: Arc::clone(&schema),
            registry,
            root: root.clone(),
            nodes,
            order: vec![root],
            detached: HashMap::new(),
            referrers: HashMap::new(),
            archive_version: LAST_KNOWN_ARCHIVE_VERSION.to_string(),
            object_version: DEFAULT_OBJECT_VERSION.to_string(),
            classes: Dictionary::new(),
        })
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// The root object's uuid.
    pub fn root(&self) -> &Uuid {
        &self.root
    }

    /// The root node.
    pub fn root_node(&self) -> &Node {
        &self.nodes[&self.root]
    }

    /// The injected schema table.
    pub fn schema(&self) -> &SchemaTable {
        &self.schema
    }

    /// The identity registry (read-only).
    pub fn registry(&self) -> &UuidRegistry {
        &self.registry
    }

    /// Generate a fresh identifier reserved in this instance.
    pub fn generate_uuid(&mut self) -> Uuid {
        self.registry.generate()
    }

    /// Generate `n` fresh identifiers reserved in this instance.
    pub fn generate_available_uuids(&mut self, n: usize) -> Vec<Uuid> {
        self.registry.generate_batch(n)
    }

    pub fn archive_version(&self) -> &str {
        &self.archive_version
    }

    pub fn object_version(&self) -> &str {
        &self.object_version
    }

    pub fn set_object_version(&mut self, version: impl Into<String>) {
        self.object_version = version.into();
    }

    pub fn classes(&self) -> &Dictionary {
        &self.classes
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root is registered for the whole lifetime.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    /// Look up a registered node by uuid.
    pub fn node(&self, uuid: &Uuid) -> Option<&Node> {
        self.nodes.get(uuid)
    }

    /// Returns `true` if `uuid` is registered (reachable from root).
    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.nodes.contains_key(uuid)
    }

    /// Returns `true` if `uuid` names a created-but-unattached node.
    pub fn is_detached(&self, uuid: &Uuid) -> bool {
        self.detached.contains_key(uuid)
    }

    /// All registered nodes in attachment order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|u| self.nodes.get(u))
    }

    /// All registered uuids in attachment order.
    pub fn uuids(&self) -> Vec<&Uuid> {
        self.order.iter().collect()
    }

    /// All registered nodes of one kind, in attachment order.
    pub fn list_by_kind(&self, kind: &str) -> Vec<&Node> {
        self.nodes().filter(|n| n.kind() == kind).collect()
    }

    /// First registered node satisfying the predicate, in attachment order.
    pub fn find(&self, predicate: impl Fn(&Node) -> bool) -> Option<&Node> {
        self.nodes().find(|n| predicate(n))
    }

    /// An attribute value, whether the node is registered or detached.
    pub fn attribute(&self, uuid: &Uuid, attr: &str) -> Option<&AttrValue> {
        self.node_anywhere(uuid).and_then(|n| n.get(attr))
    }

    /// The `(referrer, attribute)` pairs currently pointing at `uuid`,
    /// deterministically ordered.
    pub fn referrers_of(&self, uuid: &Uuid) -> Vec<(&Uuid, &str)> {
        self.referrers
            .get(uuid)
            .map(|set| set.iter().map(|(u, a)| (u, a.as_str())).collect())
            .unwrap_or_default()
    }

    /// A node's display name per its schema, if the node exists.
    pub fn display_name(&self, uuid: &Uuid) -> Option<String> {
        self.node_anywhere(uuid).map(|n| n.display_name(&self.schema))
    }

    fn node_anywhere(&self, uuid: &Uuid) -> Option<&Node> {
        self.nodes.get(uuid).or_else(|| self.detached.get(uuid))
    }

    // ---------------------------------------------------------------
    // Creation & attachment
    // ---------------------------------------------------------------

    /// Create a detached node of `kind` with its schema defaults filled in.
    ///
    /// The uuid is reserved immediately but the node is not registered until
    /// some registered node's attribute references it.
    pub fn create(&mut self, kind: &str) -> GraphResult<Uuid> {
        let schema = Arc::clone(&self.schema);
        let object_schema = schema
            .get(kind)
            .ok_or_else(|| GraphError::UnknownKind(kind.to_string()))?;

        let uuid = self.registry.generate();
        let mut node = Node::new(uuid.clone(), kind);
        for (attr, value) in object_schema.defaults() {
            node.attributes.insert(attr.to_string(), value.clone());
        }
        debug!(uuid = %uuid, kind, "created detached object");
        self.detached.insert(uuid.clone(), node);
        Ok(uuid)
    }

    /// Set an attribute.
    ///
    /// If the subject is registered and the value references detached nodes,
    /// those nodes — and transitively everything they already reference —
    /// are registered before the edge is recorded. Replacing a reference can
    /// leave former targets unreachable; they are unregistered in the same
    /// call.
    pub fn set_attribute(
        &mut self,
        subject: &Uuid,
        attr: &str,
        value: AttrValue,
    ) -> GraphResult<()> {
        let attached = self.nodes.contains_key(subject);
        if !attached && !self.detached.contains_key(subject) {
            return Err(GraphError::UnknownUuid(subject.clone()));
        }
        let new_targets: Vec<Uuid> = value.references().into_iter().cloned().collect();
        for target in &new_targets {
            if self.node_anywhere(target).is_none() {
                return Err(GraphError::UnknownUuid(target.clone()));
            }
        }

        if !attached {
            // Detached subjects carry attributes freely; their edges are
            // indexed when the subject itself is registered.
            let node = self.detached.get_mut(subject).expect("checked above");
            node.attributes.insert(attr.to_string(), value);
            return Ok(());
        }

        // A detached node may still hold edges to nodes removed since it was
        // built; validate the whole closure about to be registered before
        // mutating anything, so a stale edge never lands in the graph.
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut stack = new_targets.clone();
        while let Some(uuid) = stack.pop() {
            if !seen.insert(uuid.clone()) {
                continue;
            }
            if let Some(node) = self.detached.get(&uuid) {
                for (_, target) in node.outgoing() {
                    if self.node_anywhere(target).is_none() {
                        return Err(GraphError::UnknownUuid(target.clone()));
                    }
                    stack.push(target.clone());
                }
            }
        }

        for target in &new_targets {
            self.attach_recursive(target.clone());
        }
        let old = self
            .nodes
            .get_mut(subject)
            .expect("checked above")
            .attributes
            .insert(attr.to_string(), value);
        let old_targets: Vec<Uuid> = old
            .as_ref()
            .map(|v| v.references().into_iter().cloned().collect())
            .unwrap_or_default();
        for target in &old_targets {
            self.drop_edge(target, subject, attr);
        }
        for target in &new_targets {
            self.add_edge(target, subject, attr);
        }
        if !old_targets.is_empty() {
            self.sweep_unreachable();
        }
        Ok(())
    }

    /// Append a reference to a list-valued attribute (creating the list if
    /// the attribute is absent).
    pub fn push_reference(
        &mut self,
        subject: &Uuid,
        attr: &str,
        target: &Uuid,
    ) -> GraphResult<()> {
        let node = self
            .node_anywhere(subject)
            .ok_or_else(|| GraphError::UnknownUuid(subject.clone()))?;
        let mut list = match node.get(attr) {
            None => Vec::new(),
            Some(AttrValue::Refs(list)) => list.clone(),
            Some(_) => {
                return Err(GraphError::NotAReferenceList {
                    uuid: subject.clone(),
                    attr: attr.to_string(),
                });
            }
        };
        list.push(target.clone());
        self.set_attribute(subject, attr, AttrValue::Refs(list))
    }

    /// Remove an attribute entirely, releasing any edges it held.
    pub fn remove_attribute(&mut self, subject: &Uuid, attr: &str) -> GraphResult<()> {
        let attached = self.nodes.contains_key(subject);
        if !attached && !self.detached.contains_key(subject) {
            return Err(GraphError::UnknownUuid(subject.clone()));
        }
        if !attached {
            self.detached
                .get_mut(subject)
                .expect("checked above")
                .attributes
                .remove(attr);
            return Ok(());
        }
        let old = self
            .nodes
            .get_mut(subject)
            .expect("checked above")
            .attributes
            .remove(attr);
        let old_targets: Vec<Uuid> = old
            .as_ref()
            .map(|v| v.references().into_iter().cloned().collect())
            .unwrap_or_default();
        for target in &old_targets {
            self.drop_edge(target, subject, attr);
        }
        if !old_targets.is_empty() {
            self.sweep_unreachable();
        }
        Ok(())
    }

    /// Register a detached node and, transitively, every detached node it
    /// references, indexing their edges as they land.
    fn attach_recursive(&mut self, start: Uuid) {
        let mut stack = vec![start];
        while let Some(uuid) = stack.pop() {
            if self.nodes.contains_key(&uuid) {
                continue;
            }
            let Some(node) = self.detached.remove(&uuid) else {
                continue;
            };
            debug!(uuid = %uuid, kind = %node.kind, "registered object");
            let edges: Vec<(String, Uuid)> = node
                .outgoing()
                .into_iter()
                .map(|(a, t)| (a.to_string(), t.clone()))
                .collect();
            self.nodes.insert(uuid.clone(), node);
            self.order.push(uuid.clone());
            for (attr, target) in edges {
                self.add_edge(&target, &uuid, &attr);
                if !self.nodes.contains_key(&target) {
                    stack.push(target);
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Removal
    // ---------------------------------------------------------------

    /// Unregister a node.
    ///
    /// Every incoming edge recorded in the reverse-reference index is
    /// stripped from its referencing attribute. Referrers whose kind the
    /// schema marks as an exclusively-owned link object are removed
    /// recursively, until no node exists solely to reference something gone.
    /// Anything left unreachable afterwards is swept.
    pub fn remove(&mut self, uuid: &Uuid) -> GraphResult<()> {
        if uuid == &self.root {
            return Err(GraphError::CannotRemoveRoot);
        }
        if !self.nodes.contains_key(uuid) {
            return Err(GraphError::NotRegistered(uuid.clone()));
        }
        let schema = Arc::clone(&self.schema);

        let mut queue = vec![uuid.clone()];
        let mut removed: HashSet<Uuid> = HashSet::new();
        while let Some(current) = queue.pop() {
            if removed.contains(&current)
                || current == self.root
                || !self.nodes.contains_key(&current)
            {
                continue;
            }
            let incoming: Vec<(Uuid, String)> = self
                .referrers
                .get(&current)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();

            let node = self.nodes.remove(&current).expect("checked above");
            self.order.retain(|u| u != &current);
            debug!(uuid = %current, kind = %node.kind, "removed object");
            let outgoing: Vec<(String, Uuid)> = node
                .outgoing()
                .into_iter()
                .map(|(a, t)| (a.to_string(), t.clone()))
                .collect();
            for (attr, target) in outgoing {
                self.drop_edge(&target, &current, &attr);
            }
            self.referrers.remove(&current);
            removed.insert(current.clone());

            for (referrer, attr) in incoming {
                if removed.contains(&referrer) {
                    continue;
                }
                let cascade = self
                    .nodes
                    .get(&referrer)
                    .and_then(|n| schema.get(n.kind()))
                    .map(|s| s.is_owned_link())
                    .unwrap_or(false);
                if let Some(node) = self.nodes.get_mut(&referrer) {
                    match node.attributes.get_mut(&attr) {
                        Some(AttrValue::Ref(t)) if *t == current => {
                            node.attributes.remove(&attr);
                        }
                        Some(AttrValue::Refs(list)) => {
                            list.retain(|t| t != &current);
                        }
                        _ => {}
                    }
                }
                if cascade {
                    queue.push(referrer);
                }
            }
        }
        self.sweep_unreachable();
        Ok(())
    }

    /// Unregister everything no longer reachable from the root.
    ///
    /// A referrer count alone would leak orphaned cycles, so reachability is
    /// recomputed from the root instead.
    fn sweep_unreachable(&mut self) {
        let reachable = self.reachable_set();
        if reachable.len() == self.nodes.len() {
            return;
        }
        let doomed: Vec<Uuid> = self
            .order
            .iter()
            .filter(|u| !reachable.contains(*u))
            .cloned()
            .collect();
        for uuid in &doomed {
            if let Some(node) = self.nodes.remove(uuid) {
                debug!(uuid = %uuid, kind = %node.kind, "swept unreachable object");
                let outgoing: Vec<(String, Uuid)> = node
                    .outgoing()
                    .into_iter()
                    .map(|(a, t)| (a.to_string(), t.clone()))
                    .collect();
                for (attr, target) in outgoing {
                    self.drop_edge(&target, uuid, &attr);
                }
                self.referrers.remove(uuid);
            }
        }
        self.order.retain(|u| reachable.contains(u));
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// The set of uuids reachable from the root (cycle-safe).
    pub fn reachable_set(&self) -> HashSet<Uuid> {
        let mut visited = HashSet::new();
        let mut stack = vec![self.root.clone()];
        while let Some(uuid) = stack.pop() {
            if !visited.insert(uuid.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&uuid) {
                for (_, target) in node.outgoing() {
                    if !visited.contains(target) {
                        stack.push(target.clone());
                    }
                }
            }
        }
        visited
    }

    /// Deterministic preorder traversal from the root: attributes in
    /// canonical order, list elements in list order, each node visited once.
    pub(crate) fn dfs_order(&self) -> Vec<Uuid> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(uuid) = stack.pop() {
            if !visited.insert(uuid.clone()) {
                continue;
            }
            out.push(uuid.clone());
            if let Some(node) = self.nodes.get(&uuid) {
                let targets: Vec<Uuid> = node
                    .outgoing()
                    .into_iter()
                    .map(|(_, t)| t.clone())
                    .collect();
                for target in targets.into_iter().rev() {
                    if !visited.contains(&target) {
                        stack.push(target);
                    }
                }
            }
        }
        out
    }

    // ---------------------------------------------------------------
    // Cosmetic ordering
    // ---------------------------------------------------------------

    /// Reorder each node's schema-designated list attributes by the targets'
    /// display names, ascending and stable. Purely cosmetic: no uuid or edge
    /// changes.
    pub fn sort(&mut self) {
        let schema = Arc::clone(&self.schema);
        for uuid in self.dfs_order() {
            let Some(kind) = self.nodes.get(&uuid).map(|n| n.kind().to_string()) else {
                continue;
            };
            let Some(object_schema) = schema.get(&kind) else {
                continue;
            };
            for attr in object_schema.sorted_lists() {
                let Some(AttrValue::Refs(list)) =
                    self.nodes.get(&uuid).and_then(|n| n.get(attr)).cloned()
                else {
                    continue;
                };
                let mut keyed: Vec<(String, Uuid)> = list
                    .into_iter()
                    .map(|t| {
                        let name = self
                            .nodes
                            .get(&t)
                            .map(|n| n.display_name(&schema))
                            .unwrap_or_default();
                        (name, t)
                    })
                    .collect();
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
                let sorted: Vec<Uuid> = keyed.into_iter().map(|(_, t)| t).collect();
                if let Some(node) = self.nodes.get_mut(&uuid) {
                    node.attributes
                        .insert(attr.clone(), AttrValue::Refs(sorted));
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------

    /// Validate the graph's structural integrity:
    ///
    /// - every reference resolves to a registered node;
    /// - the registered set equals the root-reachable set;
    /// - the reverse-reference index matches the actual edges.
    pub fn validate(&self) -> GraphResult<()> {
        for node in self.nodes.values() {
            for (attr, target) in node.outgoing() {
                if !self.nodes.contains_key(target) {
                    return Err(GraphError::UnknownUuid(target.clone()));
                }
                let indexed = self
                    .referrers
                    .get(target)
                    .map(|set| set.contains(&(node.uuid().clone(), attr.to_string())))
                    .unwrap_or(false);
                if !indexed {
                    return Err(GraphError::NotRegistered(target.clone()));
                }
            }
        }
        let reachable = self.reachable_set();
        for uuid in self.nodes.keys() {
            if !reachable.contains(uuid) {
                return Err(GraphError::NotRegistered(uuid.clone()));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Edge index maintenance
    // ---------------------------------------------------------------

    fn add_edge(&mut self, target: &Uuid, referrer: &Uuid, attr: &str) {
        self.referrers
            .entry(target.clone())
            .or_default()
            .insert((referrer.clone(), attr.to_string()));
    }

    fn drop_edge(&mut self, target: &Uuid, referrer: &Uuid, attr: &str) {
        let emptied = match self.referrers.get_mut(target) {
            Some(set) => {
                set.remove(&(referrer.clone(), attr.to_string()));
                set.is_empty()
            }
            None => false,
        };
        if emptied {
            self.referrers.remove(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_schema::builtin;

    fn graph() -> ProjectGraph {
        ProjectGraph::with_seed(Arc::new(builtin::standard()), 1).unwrap()
    }

    /// Attach a named group under the project's main group, creating the
    /// main group on first use.
    fn add_group(g: &mut ProjectGraph, name: &str) -> Uuid {
        let main = match g.root_node().get("mainGroup") {
            Some(AttrValue::Ref(u)) => u.clone(),
            _ => {
                let main = g.create("PBXGroup").unwrap();
                let root = g.root().clone();
                g.set_attribute(&root, "mainGroup", AttrValue::Ref(main.clone()))
                    .unwrap();
                main
            }
        };
        let group = g.create("PBXGroup").unwrap();
        g.set_attribute(&group, "name", AttrValue::scalar(name))
            .unwrap();
        g.push_reference(&main, "children", &group).unwrap();
        group
    }

    // ----------------------------------------------------------
    // Creation & lazy registration
    // ----------------------------------------------------------

    #[test]
    fn new_project_has_only_the_root() {
        let g = graph();
        assert_eq!(g.len(), 1);
        assert_eq!(g.root_node().kind(), "PBXProject");
        g.validate().unwrap();
    }

    #[test]
    fn create_fills_schema_defaults() {
        let mut g = graph();
        let file = g.create("PBXFileReference").unwrap();
        assert_eq!(
            g.attribute(&file, "sourceTree"),
            Some(&AttrValue::scalar("SOURCE_ROOT"))
        );
        assert_eq!(
            g.attribute(&file, "includeInIndex"),
            Some(&AttrValue::scalar("1"))
        );
    }

    #[test]
    fn create_rejects_unknown_kinds() {
        let mut g = graph();
        assert_eq!(
            g.create("PBXNotAThing"),
            Err(GraphError::UnknownKind("PBXNotAThing".to_string()))
        );
    }

    #[test]
    fn create_does_not_register() {
        let mut g = graph();
        let file = g.create("PBXFileReference").unwrap();
        g.set_attribute(&file, "path", AttrValue::scalar("some/file.m"))
            .unwrap();
        assert!(!g.contains(&file));
        assert!(g.is_detached(&file));
        assert!(g.registry().is_known(&file));
    }

    #[test]
    fn attaching_registers_the_node() {
        let mut g = graph();
        let group = add_group(&mut g, "NewGroup");
        assert!(g.contains(&group));
        assert!(!g.is_detached(&group));
        g.validate().unwrap();
    }

    #[test]
    fn attaching_registers_transitive_references_and_nothing_else() {
        let mut g = graph();
        // A detached group that already references a detached file.
        let group = g.create("PBXGroup").unwrap();
        let file = g.create("PBXFileReference").unwrap();
        let stray = g.create("PBXFileReference").unwrap();
        g.push_reference(&group, "children", &file).unwrap();

        let before = g.len();
        let root = g.root().clone();
        g.set_attribute(&root, "mainGroup", AttrValue::Ref(group.clone()))
            .unwrap();

        assert!(g.contains(&group));
        assert!(g.contains(&file));
        assert!(!g.contains(&stray));
        assert_eq!(g.len(), before + 2);
        g.validate().unwrap();
    }

    #[test]
    fn attaching_stale_detached_references_is_rejected() {
        let mut g = graph();
        let root = g.root().clone();
        let target = g.create("PBXNativeTarget").unwrap();
        g.set_attribute(&root, "targets", AttrValue::Refs(vec![target.clone()]))
            .unwrap();
        // A detached dependency pointing at the target, then the target goes
        // away while the dependency is still in limbo.
        let dep = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep, "target", AttrValue::Ref(target.clone()))
            .unwrap();
        let other = g.create("PBXNativeTarget").unwrap();
        g.push_reference(&root, "targets", &other).unwrap();
        g.remove(&target).unwrap();

        assert_eq!(
            g.push_reference(&other, "dependencies", &dep),
            Err(GraphError::UnknownUuid(target))
        );
        assert!(g.is_detached(&dep));
        g.validate().unwrap();
    }

    #[test]
    fn set_attribute_rejects_unknown_targets() {
        let mut g = graph();
        let root = g.root().clone();
        let ghost = Uuid::from_static("FFFFFFFFFFFFFFFFFFFFFFFF");
        assert_eq!(
            g.set_attribute(&root, "mainGroup", AttrValue::Ref(ghost.clone())),
            Err(GraphError::UnknownUuid(ghost))
        );
    }

    // ----------------------------------------------------------
    // Reverse references
    // ----------------------------------------------------------

    #[test]
    fn reverse_index_tracks_edges() {
        let mut g = graph();
        let group = add_group(&mut g, "Sources");
        let referrers = g.referrers_of(&group);
        assert_eq!(referrers.len(), 1);
        assert_eq!(referrers[0].1, "children");
    }

    #[test]
    fn replacing_a_reference_sweeps_the_orphan() {
        let mut g = graph();
        let root = g.root().clone();
        let first = g.create("PBXGroup").unwrap();
        g.set_attribute(&root, "mainGroup", AttrValue::Ref(first.clone()))
            .unwrap();
        let second = g.create("PBXGroup").unwrap();
        g.set_attribute(&root, "mainGroup", AttrValue::Ref(second.clone()))
            .unwrap();

        assert!(!g.contains(&first));
        assert!(g.contains(&second));
        g.validate().unwrap();
    }

    #[test]
    fn orphaned_cycles_are_swept() {
        let mut g = graph();
        let root = g.root().clone();
        // Two targets depending on each other, held by the project.
        let a = g.create("PBXNativeTarget").unwrap();
        let b = g.create("PBXNativeTarget").unwrap();
        g.set_attribute(&root, "targets", AttrValue::Refs(vec![a.clone(), b.clone()]))
            .unwrap();
        let dep_a = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep_a, "target", AttrValue::Ref(b.clone()))
            .unwrap();
        g.push_reference(&a, "dependencies", &dep_a).unwrap();
        let dep_b = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep_b, "target", AttrValue::Ref(a.clone()))
            .unwrap();
        g.push_reference(&b, "dependencies", &dep_b).unwrap();
        g.validate().unwrap();

        // Cutting the project's hold on both leaves an unreachable cycle.
        g.set_attribute(&root, "targets", AttrValue::Refs(vec![]))
            .unwrap();
        assert!(!g.contains(&a));
        assert!(!g.contains(&b));
        assert!(!g.contains(&dep_a));
        assert!(!g.contains(&dep_b));
        g.validate().unwrap();
    }

    // ----------------------------------------------------------
    // Removal
    // ----------------------------------------------------------

    #[test]
    fn remove_rejects_root_and_unregistered() {
        let mut g = graph();
        let root = g.root().clone();
        assert_eq!(g.remove(&root), Err(GraphError::CannotRemoveRoot));

        let detached = g.create("PBXGroup").unwrap();
        assert_eq!(
            g.remove(&detached),
            Err(GraphError::NotRegistered(detached))
        );
    }

    #[test]
    fn remove_strips_incoming_edges() {
        let mut g = graph();
        let group = add_group(&mut g, "Sources");
        let main = g.root_node().get("mainGroup").unwrap().as_ref_uuid().unwrap().clone();

        g.remove(&group).unwrap();
        assert!(!g.contains(&group));
        let children = g.attribute(&main, "children").unwrap().as_ref_list().unwrap();
        assert!(children.is_empty());
        g.validate().unwrap();
    }

    #[test]
    fn remove_cascades_through_owned_links() {
        let mut g = graph();
        let root = g.root().clone();
        let target = g.create("PBXNativeTarget").unwrap();
        g.set_attribute(&root, "targets", AttrValue::Refs(vec![target.clone()]))
            .unwrap();

        // Two link objects whose sole purpose is pointing at the target,
        // and one independent group that shares no edge with it.
        let proxy = g.create("PBXContainerItemProxy").unwrap();
        g.set_attribute(&proxy, "containerPortal", AttrValue::Ref(target.clone()))
            .unwrap();
        let dep = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep, "target", AttrValue::Ref(target.clone()))
            .unwrap();
        let other = g.create("PBXNativeTarget").unwrap();
        g.push_reference(&root, "targets", &other).unwrap();
        g.push_reference(&other, "dependencies", &dep).unwrap();
        let keeper = add_group(&mut g, "Keeper");

        // The proxy is held by the dependency, as in a real document.
        g.set_attribute(&dep, "targetProxy", AttrValue::Ref(proxy.clone()))
            .unwrap();
        g.validate().unwrap();

        g.remove(&target).unwrap();
        assert!(!g.contains(&target));
        assert!(!g.contains(&proxy), "owned link proxy must cascade");
        assert!(!g.contains(&dep), "owned link dependency must cascade");
        assert!(g.contains(&other));
        assert!(g.contains(&keeper));
        assert!(
            g.attribute(&other, "dependencies")
                .unwrap()
                .as_ref_list()
                .unwrap()
                .is_empty()
        );
        g.validate().unwrap();
    }

    #[test]
    fn removed_uuids_stay_reserved() {
        let mut g = graph();
        let group = add_group(&mut g, "Gone");
        g.remove(&group).unwrap();
        assert!(g.registry().is_known(&group));
    }

    // ----------------------------------------------------------
    // Queries
    // ----------------------------------------------------------

    #[test]
    fn list_by_kind_in_attachment_order() {
        let mut g = graph();
        let first = add_group(&mut g, "B");
        let second = add_group(&mut g, "A");
        let groups = g.list_by_kind("PBXGroup");
        // main group, then the two added groups in attachment order.
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].uuid(), &first);
        assert_eq!(groups[2].uuid(), &second);
    }

    #[test]
    fn find_by_predicate() {
        let mut g = graph();
        add_group(&mut g, "Pods");
        let found = g.find(|n| n.scalar("name") == Some("Pods")).unwrap();
        assert_eq!(found.kind(), "PBXGroup");
        assert!(g.find(|n| n.scalar("name") == Some("Missing")).is_none());
    }

    // ----------------------------------------------------------
    // Sorting
    // ----------------------------------------------------------

    #[test]
    fn sort_orders_designated_lists_by_display_name() {
        let mut g = graph();
        let root = g.root().clone();
        add_group(&mut g, "Test");
        let test = g
            .find(|n| n.scalar("name") == Some("Test"))
            .unwrap()
            .uuid()
            .clone();
        for name in ["B", "A"] {
            let child = g.create("PBXGroup").unwrap();
            g.set_attribute(&child, "name", AttrValue::scalar(name))
                .unwrap();
            g.push_reference(&test, "children", &child).unwrap();
        }
        for name in ["B", "A"] {
            let target = g.create("PBXNativeTarget").unwrap();
            g.set_attribute(&target, "name", AttrValue::scalar(name))
                .unwrap();
            g.push_reference(&root, "targets", &target).unwrap();
        }

        let uuids_before: Vec<Uuid> = g.uuids().into_iter().cloned().collect();
        g.sort();

        let names = |list: &[Uuid], g: &ProjectGraph| -> Vec<String> {
            list.iter()
                .map(|u| g.display_name(u).unwrap())
                .collect()
        };
        let children = g.attribute(&test, "children").unwrap().as_ref_list().unwrap().to_vec();
        assert_eq!(names(&children, &g), vec!["A", "B"]);
        let targets = g.attribute(&root, "targets").unwrap().as_ref_list().unwrap().to_vec();
        assert_eq!(names(&targets, &g), vec!["A", "B"]);

        // Cosmetic only: same uuids, same registration order.
        let uuids_after: Vec<Uuid> = g.uuids().into_iter().cloned().collect();
        assert_eq!(uuids_before, uuids_after);
        g.validate().unwrap();
    }

    // ----------------------------------------------------------
    // Cycles
    // ----------------------------------------------------------

    #[test]
    fn cyclic_dependencies_traverse_safely() {
        let mut g = graph();
        let root = g.root().clone();
        let a = g.create("PBXNativeTarget").unwrap();
        let b = g.create("PBXNativeTarget").unwrap();
        g.set_attribute(&root, "targets", AttrValue::Refs(vec![a.clone(), b.clone()]))
            .unwrap();
        let dep_a = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep_a, "target", AttrValue::Ref(b.clone())).unwrap();
        g.push_reference(&a, "dependencies", &dep_a).unwrap();
        let dep_b = g.create("PBXTargetDependency").unwrap();
        g.set_attribute(&dep_b, "target", AttrValue::Ref(a.clone())).unwrap();
        g.push_reference(&b, "dependencies", &dep_b).unwrap();

        let reachable = g.reachable_set();
        assert!(reachable.contains(&a));
        assert!(reachable.contains(&b));
        assert_eq!(g.dfs_order().len(), g.len());
        g.validate().unwrap();
    }
}
