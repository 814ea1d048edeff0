//! Flattening a graph into a comparison-friendly JSON tree.

use serde_json::{Map, Value as Json};

use pbx_graph::{Node, ProjectGraph};
use pbx_types::{AttrValue, Uuid};

/// Expand a graph into a nested JSON tree.
///
/// The top level mirrors the document header with `rootObject` expanded
/// inline. Each node becomes an object holding its `isa`, a `displayName`
/// resolved through the schema, and its attributes with references replaced
/// by the referenced node's own expansion. A reference back into a node
/// currently being expanded is rendered as the bare identifier string, so
/// cyclic graphs produce finite trees.
pub fn tree_snapshot(graph: &ProjectGraph) -> Json {
    let mut top = Map::new();
    top.insert(
        "archiveVersion".to_string(),
        Json::String(graph.archive_version().to_string()),
    );
    top.insert("classes".to_string(), plist_to_json_dict(graph.classes()));
    top.insert(
        "objectVersion".to_string(),
        Json::String(graph.object_version().to_string()),
    );
    let mut in_progress = Vec::new();
    top.insert(
        "rootObject".to_string(),
        expand_uuid(graph, graph.root(), &mut in_progress),
    );
    Json::Object(top)
}

fn expand_uuid(graph: &ProjectGraph, uuid: &Uuid, in_progress: &mut Vec<Uuid>) -> Json {
    if in_progress.contains(uuid) {
        return Json::String(uuid.as_str().to_string());
    }
    let Some(node) = graph.node(uuid) else {
        return Json::String(uuid.as_str().to_string());
    };
    in_progress.push(uuid.clone());
    let expanded = expand_node(graph, node, in_progress);
    in_progress.pop();
    expanded
}

fn expand_node(graph: &ProjectGraph, node: &Node, in_progress: &mut Vec<Uuid>) -> Json {
    let mut out = Map::new();
    out.insert(
        "displayName".to_string(),
        Json::String(node.display_name(graph.schema())),
    );
    out.insert("isa".to_string(), Json::String(node.kind().to_string()));
    for (attr, value) in node.attributes() {
        out.insert(attr.to_string(), expand_attr(graph, value, in_progress));
    }
    Json::Object(out)
}

fn expand_attr(graph: &ProjectGraph, value: &AttrValue, in_progress: &mut Vec<Uuid>) -> Json {
    match value {
        AttrValue::Scalar(s) => Json::String(s.clone()),
        AttrValue::List(items) => Json::Array(
            items
                .iter()
                .map(|v| expand_attr(graph, v, in_progress))
                .collect(),
        ),
        AttrValue::Dict(dict) => Json::Object(
            dict.iter()
                .map(|(k, v)| (k.clone(), expand_attr(graph, v, in_progress)))
                .collect(),
        ),
        AttrValue::Ref(target) => expand_uuid(graph, target, in_progress),
        AttrValue::Refs(targets) => Json::Array(
            targets
                .iter()
                .map(|t| expand_uuid(graph, t, in_progress))
                .collect(),
        ),
    }
}

fn plist_to_json_dict(dict: &pbx_plist::Dictionary) -> Json {
    Json::Object(
        dict.iter()
            .map(|(k, v)| (k.clone(), plist_to_json(v)))
            .collect(),
    )
}

fn plist_to_json(value: &pbx_plist::Value) -> Json {
    match value {
        pbx_plist::Value::String(s) => Json::String(s.clone()),
        pbx_plist::Value::Array(items) => {
            Json::Array(items.iter().map(plist_to_json).collect())
        }
        pbx_plist::Value::Dict(dict) => plist_to_json_dict(dict),
    }
}
