//! Operations on the JSON tree backing a store.

use serde_json::{Map, Value};

use crate::StorePath;

/// Returns the value at `path`, if any.
pub(crate) fn get<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if is_empty(node) { None } else { Some(node) }
}

/// Stores `value` at `path`, creating intermediate objects as needed.
///
/// Nulls and empty objects inside `value` are dropped first. If nothing is
/// left, the location is deleted and emptied ancestors are pruned.
pub(crate) fn set(root: &mut Value, path: &StorePath, value: Value) {
    match prune(value) {
        Some(value) => insert(root, path.segments(), value),
        None => {
            delete(root, path.segments());
        }
    }
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
}

/// Removes nulls and empty objects, recursively. Returns `None` if the
/// value itself ends up empty.
pub(crate) fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            if pruned.is_empty() {
                None
            } else {
                Some(Value::Object(pruned))
            }
        }
        other => Some(other),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn insert(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        insert(child, rest, value);
    }
}

/// Deletes the value at `segments`. Returns `true` if `node` itself is
/// left empty and should be removed by its parent.
fn delete(node: &mut Value, segments: &[String]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        *node = Value::Null;
        return true;
    };
    let Value::Object(map) = node else {
        return false;
    };
    let remove_child = match map.get_mut(head) {
        Some(child) => delete(child, rest),
        None => false,
    };
    if remove_child {
        map.remove(head);
    }
    map.is_empty()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn p(raw: &str) -> StorePath {
        StorePath::parse(raw).unwrap()
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut root = json!({});
        set(&mut root, &p("rooms/r/meta/name"), json!("Sprint"));
        assert_eq!(root, json!({"rooms": {"r": {"meta": {"name": "Sprint"}}}}));
        assert_eq!(get(&root, &p("rooms/r/meta/name")), Some(&json!("Sprint")));
    }

    #[test]
    fn test_set_null_deletes_and_prunes_ancestors() {
        let mut root = json!({"rooms": {"r": {"players": {"u1": {"name": "A"}}}}});
        set(&mut root, &p("rooms/r/players/u1"), Value::Null);
        assert_eq!(root, json!({}));
        assert_eq!(get(&root, &p("rooms")), None);
    }

    #[test]
    fn test_set_drops_null_fields_inside_objects() {
        let mut root = json!({});
        set(
            &mut root,
            &p("rooms/r/meta"),
            json!({"revealed": false, "countdownStart": null}),
        );
        assert_eq!(get(&root, &p("rooms/r/meta")), Some(&json!({"revealed": false})));
    }

    #[test]
    fn test_set_replaces_scalar_with_object() {
        let mut root = json!({"a": 1});
        set(&mut root, &p("a/b"), json!(2));
        assert_eq!(root, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_delete_missing_path_is_noop() {
        let mut root = json!({"a": {"b": 1}});
        set(&mut root, &p("a/c/d"), Value::Null);
        assert_eq!(root, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_get_root_of_empty_tree_is_none() {
        let root = json!({});
        assert_eq!(get(&root, &StorePath::root()), None);
    }

    #[test]
    fn test_prune_keeps_arrays_and_scalars() {
        assert_eq!(prune(json!(["0", "1"])), Some(json!(["0", "1"])));
        assert_eq!(prune(json!({"a": {}})), None);
        assert_eq!(prune(json!(false)), Some(json!(false)));
    }
}
