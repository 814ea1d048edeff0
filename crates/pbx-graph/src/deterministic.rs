//! Deterministic identifier rewriting.
//!
//! Replaces every registered uuid with the MD5 digest of the node's
//! canonical path from the root, so two graphs built the same way carry the
//! same identifiers regardless of what the random registry issued. The root
//! path is the empty string; each hop appends `/<attribute>` (plus
//! `/<index>` inside a list) and `/<kind>` of the node stepped into. A node
//! reachable along several chains takes the path of the first chain a
//! deterministic depth-first walk finds.

use std::collections::{BTreeMap, HashMap, HashSet};

use md5::{Digest, Md5};
use tracing::debug;

use pbx_types::{AttrValue, Uuid};

use crate::graph::ProjectGraph;

/// The identifier the root object receives: MD5 of the empty path.
pub const PREDICTABLE_ROOT_UUID: &str = "D41D8CD98F00B204E9800998ECF8427E";

impl ProjectGraph {
    /// Rewrite every registered identifier to the digest of its canonical
    /// path. All paths are computed against the pre-rewrite graph, then the
    /// replacement map is applied in one step, so the walk never mixes old
    /// and new identifiers.
    pub fn predictabilize_uuids(&mut self) {
        let paths = self.canonical_paths();
        let replacements = digest_paths(&paths);
        self.apply_replacements(&replacements);
        debug!(rewritten = replacements.len(), "predictabilized identifiers");
    }

    /// Canonical path per registered node, in deterministic first-visit
    /// order: attributes in canonical order, list elements by position.
    fn canonical_paths(&self) -> Vec<(Uuid, String)> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![(self.root.clone(), String::new())];
        while let Some((uuid, path)) = stack.pop() {
            if !visited.insert(uuid.clone()) {
                continue;
            }
            let Some(node) = self.nodes.get(&uuid) else {
                continue;
            };
            // Children are pushed in reverse so the stack pops them in
            // canonical order.
            let mut children: Vec<(Uuid, String)> = Vec::new();
            for (attr, value) in node.attributes() {
                match value {
                    AttrValue::Ref(target) => {
                        let kind = self.kind_of(target);
                        children.push((target.clone(), format!("{path}/{attr}/{kind}")));
                    }
                    AttrValue::Refs(targets) => {
                        for (i, target) in targets.iter().enumerate() {
                            let kind = self.kind_of(target);
                            children
                                .push((target.clone(), format!("{path}/{attr}/{i}/{kind}")));
                        }
                    }
                    _ => {}
                }
            }
            for child in children.into_iter().rev() {
                if !visited.contains(&child.0) {
                    stack.push(child);
                }
            }
            out.push((uuid, path));
        }
        out
    }

    fn kind_of(&self, uuid: &Uuid) -> &str {
        self.nodes.get(uuid).map(|n| n.kind()).unwrap_or_default()
    }

    fn apply_replacements(&mut self, replacements: &HashMap<Uuid, Uuid>) {
        let rename = |uuid: &Uuid| -> Uuid {
            replacements.get(uuid).cloned().unwrap_or_else(|| uuid.clone())
        };

        self.root = rename(&self.root);
        let renamed_order: Vec<Uuid> = self.order.iter().map(&rename).collect();
        self.order = renamed_order;

        let old_nodes = std::mem::take(&mut self.nodes);
        for (old_uuid, mut node) in old_nodes {
            let new_uuid = rename(&old_uuid);
            node.uuid = new_uuid.clone();
            for value in node.attributes.values_mut() {
                match value {
                    AttrValue::Ref(target) => *target = rename(target),
                    AttrValue::Refs(targets) => {
                        for target in targets.iter_mut() {
                            *target = rename(target);
                        }
                    }
                    _ => {}
                }
            }
            self.nodes.insert(new_uuid, node);
        }

        // Detached nodes keep their own uuids but may point at attached
        // nodes, and those edges must survive the rewrite.
        for node in self.detached.values_mut() {
            for value in node.attributes.values_mut() {
                match value {
                    AttrValue::Ref(target) => *target = rename(target),
                    AttrValue::Refs(targets) => {
                        for target in targets.iter_mut() {
                            *target = rename(target);
                        }
                    }
                    _ => {}
                }
            }
        }

        self.referrers.clear();
        let edges: Vec<(Uuid, Uuid, String)> = self
            .nodes
            .values()
            .flat_map(|node| {
                node.outgoing()
                    .into_iter()
                    .map(|(attr, target)| (target.clone(), node.uuid().clone(), attr.to_string()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (target, referrer, attr) in edges {
            self.referrers
                .entry(target)
                .or_default()
                .insert((referrer, attr));
        }

        for new_uuid in replacements.values() {
            self.registry.record(new_uuid);
        }
    }
}

/// Digest each path, breaking ties deterministically: within a digest that
/// several paths produce, the paths are ordered lexicographically and the
/// k-th (k ≥ 1) takes the digest of `path || NUL || k` instead.
fn digest_paths(paths: &[(Uuid, String)]) -> HashMap<Uuid, Uuid> {
    let mut by_digest: BTreeMap<String, Vec<(Uuid, String)>> = BTreeMap::new();
    for (uuid, path) in paths {
        by_digest
            .entry(md5_hex(path.as_bytes()))
            .or_default()
            .push((uuid.clone(), path.clone()));
    }

    let mut out = HashMap::with_capacity(paths.len());
    for (digest, mut group) in by_digest {
        group.sort_by(|a, b| a.1.cmp(&b.1));
        for (k, (uuid, path)) in group.into_iter().enumerate() {
            let assigned = if k == 0 {
                digest.clone()
            } else {
                let mut salted = path.into_bytes();
                salted.push(0);
                salted.extend_from_slice(k.to_string().as_bytes());
                md5_hex(&salted)
            };
            let assigned = Uuid::parse(assigned).expect("digest is non-empty hex");
            out.insert(uuid, assigned);
        }
    }
    out
}

fn md5_hex(bytes: &[u8]) -> String {
    let digest = Md5::digest(bytes);
    let mut out = String::with_capacity(32);
    for byte in digest {
        out.push_str(&format!("{byte:02X}"));
    }
    out
}
