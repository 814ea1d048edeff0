//! Recursive comparison of snapshot trees.

use serde_json::{Map, Value as Json};

use pbx_graph::ProjectGraph;

use crate::snapshot::tree_snapshot;

/// Compare two JSON trees, returning a tree holding only the differences.
///
/// - Objects are compared key-wise: a key present on one side only, or
///   differing below, contributes an entry; agreeing keys vanish.
/// - Arrays are compared by position. Element `i` differing on both sides
///   appears under the key `"<i>"`; elements past the shorter side appear
///   under `"inserted_<i>"` (only in the second tree) or `"deleted_<i>"`
///   (only in the first).
/// - Anything else is a leaf: a mismatch is reported as
///   `{"value_1": left, "value_2": right}`.
///
/// `None` means the trees are equivalent.
pub fn diff(left: &Json, right: &Json) -> Option<Json> {
    match (left, right) {
        (Json::Object(a), Json::Object(b)) => diff_objects(a, b),
        (Json::Array(a), Json::Array(b)) => diff_arrays(a, b),
        (a, b) if a == b => None,
        (a, b) => Some(leaf(a.clone(), b.clone())),
    }
}

/// Snapshot both graphs and compare the trees.
pub fn project_diff(left: &ProjectGraph, right: &ProjectGraph) -> Option<Json> {
    diff(&tree_snapshot(left), &tree_snapshot(right))
}

fn diff_objects(left: &Map<String, Json>, right: &Map<String, Json>) -> Option<Json> {
    let mut out = Map::new();
    for (key, left_value) in left {
        match right.get(key) {
            Some(right_value) => {
                if let Some(d) = diff(left_value, right_value) {
                    out.insert(key.clone(), d);
                }
            }
            None => {
                out.insert(key.clone(), leaf(left_value.clone(), Json::Null));
            }
        }
    }
    for (key, right_value) in right {
        if !left.contains_key(key) {
            out.insert(key.clone(), leaf(Json::Null, right_value.clone()));
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(Json::Object(out))
    }
}

fn diff_arrays(left: &[Json], right: &[Json]) -> Option<Json> {
    let mut out = Map::new();
    let shared = left.len().min(right.len());
    for i in 0..shared {
        if let Some(d) = diff(&left[i], &right[i]) {
            out.insert(i.to_string(), d);
        }
    }
    for (i, value) in left.iter().enumerate().skip(shared) {
        out.insert(format!("deleted_{i}"), value.clone());
    }
    for (i, value) in right.iter().enumerate().skip(shared) {
        out.insert(format!("inserted_{i}"), value.clone());
    }
    if out.is_empty() {
        None
    } else {
        Some(Json::Object(out))
    }
}

fn leaf(left: Json, right: Json) -> Json {
    let mut out = Map::new();
    out.insert("value_1".to_string(), left);
    out.insert("value_2".to_string(), right);
    Json::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use pbx_schema::builtin;
    use pbx_types::AttrValue;

    fn graph(seed: u64) -> ProjectGraph {
        ProjectGraph::with_seed(Arc::new(builtin::standard()), seed).unwrap()
    }

    // ----------------------------------------------------------
    // Leaves and objects
    // ----------------------------------------------------------

    #[test]
    fn equal_values_produce_no_diff() {
        assert_eq!(diff(&json!("a"), &json!("a")), None);
        assert_eq!(diff(&json!({"k": ["x"]}), &json!({"k": ["x"]})), None);
    }

    #[test]
    fn leaf_mismatch_reports_both_sides() {
        assert_eq!(
            diff(&json!("46"), &json!("50")),
            Some(json!({"value_1": "46", "value_2": "50"}))
        );
    }

    #[test]
    fn object_diff_keeps_only_disagreeing_keys() {
        let a = json!({"same": "x", "changed": "1", "gone": "y"});
        let b = json!({"same": "x", "changed": "2", "new": "z"});
        assert_eq!(
            diff(&a, &b),
            Some(json!({
                "changed": {"value_1": "1", "value_2": "2"},
                "gone": {"value_1": "y", "value_2": null},
                "new": {"value_1": null, "value_2": "z"},
            }))
        );
    }

    #[test]
    fn type_mismatch_is_a_leaf() {
        assert_eq!(
            diff(&json!({"k": "v"}), &json!(["v"])),
            Some(json!({"value_1": {"k": "v"}, "value_2": ["v"]}))
        );
    }

    // ----------------------------------------------------------
    // Arrays
    // ----------------------------------------------------------

    #[test]
    fn arrays_compare_by_position() {
        let a = json!(["a", "b", "c"]);
        let b = json!(["a", "x", "c", "d"]);
        assert_eq!(
            diff(&a, &b),
            Some(json!({
                "1": {"value_1": "b", "value_2": "x"},
                "inserted_3": "d",
            }))
        );
    }

    #[test]
    fn shrunk_arrays_report_deletions() {
        assert_eq!(
            diff(&json!(["a", "b"]), &json!(["a"])),
            Some(json!({"deleted_1": "b"}))
        );
    }

    #[test]
    fn reordered_arrays_are_differences() {
        // Position matters: a permutation is two changed slots, not a match.
        let a = json!(["a", "b"]);
        let b = json!(["b", "a"]);
        assert_eq!(
            diff(&a, &b),
            Some(json!({
                "0": {"value_1": "a", "value_2": "b"},
                "1": {"value_1": "b", "value_2": "a"},
            }))
        );
    }

    // ----------------------------------------------------------
    // Whole projects
    // ----------------------------------------------------------

    #[test]
    fn identical_graphs_diff_to_none() {
        let mut a = graph(1);
        let mut b = graph(2);
        a.predictabilize_uuids();
        b.predictabilize_uuids();
        assert_eq!(project_diff(&a, &b), None);
    }

    #[test]
    fn an_added_group_surfaces_on_its_path_only() {
        let build = |seed: u64, with_pods: bool| {
            let mut g = graph(seed);
            let root = g.root().clone();
            let main = g.create("PBXGroup").unwrap();
            g.set_attribute(&root, "mainGroup", AttrValue::Ref(main.clone()))
                .unwrap();
            if with_pods {
                let pods = g.create("PBXGroup").unwrap();
                g.set_attribute(&pods, "name", AttrValue::scalar("Pods"))
                    .unwrap();
                g.push_reference(&main, "children", &pods).unwrap();
            }
            g.predictabilize_uuids();
            g
        };
        let before = build(1, false);
        let after = build(2, true);

        let d = project_diff(&before, &after).unwrap();
        let obj = d.as_object().unwrap();
        assert_eq!(obj.len(), 1, "only rootObject should differ: {d}");
        let children = &d["rootObject"]["mainGroup"]["children"];
        assert_eq!(
            children["inserted_0"]["displayName"],
            json!("Pods")
        );
    }

    #[test]
    fn header_changes_surface_at_the_top() {
        let mut a = graph(1);
        let mut b = graph(2);
        b.set_object_version("50");
        a.predictabilize_uuids();
        b.predictabilize_uuids();
        assert_eq!(
            project_diff(&a, &b),
            Some(json!({
                "objectVersion": {"value_1": "46", "value_2": "50"},
            }))
        );
    }
}
