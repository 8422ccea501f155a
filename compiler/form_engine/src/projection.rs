//! Snapshots of visible field values.

use serde_json::{Map, Value};

use crate::store::FieldStore;
use crate::{FormError, FormResult};

/// `key -> value` for every visible field, in declaration order.
pub(crate) fn visible_values(store: &FieldStore) -> Map<String, Value> {
    store
        .iter()
        .filter(|field| field.state.visible)
        .map(|field| (field.key.clone(), field.state.value.clone()))
        .collect()
}

/// Intermediate tree: keeps "a value lives here" apart from "a parent of
/// other keys lives here", which a JSON object alone cannot.
enum Node {
    Leaf(Value),
    Branch(Vec<(String, Node)>),
}

/// Visible values nested by splitting keys on `sep`.
///
/// Fails with `SchemaConflict` when one visible key is a strict prefix of
/// another (or two keys are equal after splitting).
pub(crate) fn visible_values_tree(store: &FieldStore, sep: &str) -> FormResult<Value> {
    let mut root = Vec::new();
    for field in store.iter().filter(|field| field.state.visible) {
        let segments: Vec<&str> = field.key.split(sep).collect();
        insert(&mut root, &segments, 0, field.state.value.clone(), sep)?;
    }
    Ok(into_value(root))
}

fn insert(
    children: &mut Vec<(String, Node)>,
    segments: &[&str],
    depth: usize,
    value: Value,
    sep: &str,
) -> FormResult<()> {
    let conflict = || FormError::SchemaConflict(segments[..=depth].join(sep));
    let head = segments[depth];
    let existing = children.iter().position(|(name, _)| name == head);

    if depth + 1 == segments.len() {
        if existing.is_some() {
            return Err(conflict());
        }
        children.push((head.to_string(), Node::Leaf(value)));
        return Ok(());
    }

    let pos = existing.unwrap_or_else(|| {
        children.push((head.to_string(), Node::Branch(Vec::new())));
        children.len() - 1
    });
    match &mut children[pos].1 {
        Node::Branch(grandchildren) => insert(grandchildren, segments, depth + 1, value, sep),
        Node::Leaf(_) => Err(conflict()),
    }
}

fn into_value(children: Vec<(String, Node)>) -> Value {
    let map: Map<String, Value> = children
        .into_iter()
        .map(|(name, node)| {
            let value = match node {
                Node::Leaf(value) => value,
                Node::Branch(grandchildren) => into_value(grandchildren),
            };
            (name, value)
        })
        .collect();
    Value::Object(map)
}
