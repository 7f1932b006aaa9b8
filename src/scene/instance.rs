use std::collections::{HashMap, HashSet};

use crate::foundation::core::NodeId;
use crate::scene::build::SceneGraph;
use crate::scene::node::{Node, NodeType, PropNodeField, apply_override, node_id_from};
use crate::schema::Value;

/// Expand every INSTANCE in the graph: clone its symbol's subtree, apply
/// guid-path overrides and component property assignments, and attach the
/// clones as the instance's children.
///
/// Clones keep the original symbol node ids but are never registered in the
/// id index; they are distinct occurrences under their host instance.
pub(crate) fn expand_instances(graph: &mut SceneGraph) {
    let instances: Vec<usize> = graph
        .arena
        .iter()
        .enumerate()
        .filter(|(_, n)| n.node_type == NodeType::Instance && n.children.is_empty())
        .map(|(idx, _)| idx)
        .collect();

    for idx in instances {
        let mut visited = HashSet::new();
        expand_one(graph, idx, &mut visited);
    }
}

fn expand_one(graph: &mut SceneGraph, instance_idx: usize, visited: &mut HashSet<NodeId>) {
    let Some(symbol_id) = graph.arena[instance_idx].symbol_id else {
        return;
    };
    let Some(symbol_idx) = graph.by_id.get(&symbol_id).copied() else {
        graph
            .warnings
            .push(format!("instance references missing symbol {symbol_id}"));
        return;
    };
    if !visited.insert(symbol_id) {
        graph
            .warnings
            .push(format!("instance cycle through symbol {symbol_id}"));
        return;
    }

    // Candidate override paths: the `>`-joined override-key stack at every
    // node below the symbol root.
    let mut path_to_node = HashMap::new();
    let mut stack = Vec::new();
    for &child in graph.arena[symbol_idx].children.clone().iter() {
        collect_paths(graph, child, &mut stack, &mut path_to_node);
    }

    let overrides = resolve_overrides(graph, instance_idx, &path_to_node);
    let assignments = graph.arena[instance_idx].component_prop_assignments.clone();

    let symbol_children = graph.arena[symbol_idx].children.clone();
    let mut clones = Vec::with_capacity(symbol_children.len());
    for child in symbol_children {
        let clone_idx = clone_subtree(graph, child, &overrides, &assignments, visited);
        clones.push(clone_idx);
    }
    graph.arena[instance_idx].children = clones;
    visited.remove(&symbol_id);
}

fn collect_paths(
    graph: &SceneGraph,
    idx: usize,
    stack: &mut Vec<String>,
    out: &mut HashMap<String, usize>,
) {
    let pushed = if graph.arena[idx].override_key.is_empty() {
        false
    } else {
        stack.push(hex(&graph.arena[idx].override_key));
        true
    };
    if !stack.is_empty() {
        out.insert(stack.join(">"), idx);
    }
    for &child in &graph.arena[idx].children {
        collect_paths(graph, child, stack, out);
    }
    if pushed {
        stack.pop();
    }
}

/// Merged override records per symbol-subtree node index. Entries are
/// applied shallow-to-deep so a deeper path wins per field, and a repeated
/// path resolves by last write.
fn resolve_overrides(
    graph: &mut SceneGraph,
    instance_idx: usize,
    path_to_node: &HashMap<String, usize>,
) -> HashMap<usize, Vec<Value>> {
    let entries = graph.arena[instance_idx].symbol_overrides.clone();
    let mut keyed: Vec<(usize, usize, usize, Value)> = Vec::new();

    for (seq, entry) in entries.iter().enumerate() {
        let guids = entry.get_path(&["guidPath", "guids"]).as_array();
        if guids.is_empty() {
            continue;
        }
        let path = guids
            .iter()
            .map(|g| hex(key_bytes(g)))
            .collect::<Vec<_>>()
            .join(">");
        match path_to_node.get(&path) {
            Some(&node_idx) => keyed.push((guids.len(), seq, node_idx, entry.clone())),
            None => graph
                .warnings
                .push(format!("override path {path} matches no symbol node")),
        }
    }

    keyed.sort_by_key(|&(depth, seq, _, _)| (depth, seq));

    let mut by_node: HashMap<usize, Vec<Value>> = HashMap::new();
    for (_, _, node_idx, entry) in keyed {
        by_node.entry(node_idx).or_default().push(entry);
    }
    by_node
}

fn clone_subtree(
    graph: &mut SceneGraph,
    source_idx: usize,
    overrides: &HashMap<usize, Vec<Value>>,
    assignments: &[Value],
    visited: &mut HashSet<NodeId>,
) -> usize {
    let mut node = graph.arena[source_idx].clone();
    node.children = Vec::new();

    if let Some(entries) = overrides.get(&source_idx) {
        for entry in entries {
            apply_override(&mut node, entry);
            for assignment in entry.get("componentPropAssignments").as_array() {
                apply_prop_assignment(&mut node, assignment);
            }
        }
    }
    for assignment in assignments {
        apply_prop_assignment(&mut node, assignment);
    }

    let source_children = graph.arena[source_idx].children.clone();
    let clone_idx = graph.arena.len();
    graph.arena.push(node);

    let mut children = Vec::with_capacity(source_children.len());
    for child in source_children {
        children.push(clone_subtree(graph, child, overrides, assignments, visited));
    }
    graph.arena[clone_idx].children = children;

    // A cloned nested instance expands in turn, guarded by the visited set.
    if graph.arena[clone_idx].node_type == NodeType::Instance
        && graph.arena[clone_idx].children.is_empty()
    {
        expand_one(graph, clone_idx, visited);
    }
    clone_idx
}

fn apply_prop_assignment(node: &mut Node, assignment: &Value) {
    let def_id = assignment.get("defID").as_bytes();
    if def_id.is_empty() {
        return;
    }
    let Some(field) = node
        .component_prop_refs
        .iter()
        .find(|r| r.def_id == def_id)
        .map(|r| r.field)
    else {
        return;
    };
    let value = assignment.get("value");
    match field {
        PropNodeField::TextData => {
            let text = value.get_path(&["textValue", "characters"]).as_str();
            node.characters = text.to_string();
        }
        PropNodeField::Visible => node.visible = value.get("boolValue").as_bool(),
        PropNodeField::OverriddenSymbolId => {
            node.symbol_id = node_id_from(value.get("guidValue")).or(node.symbol_id);
        }
    }
}

/// Textual override content for the stacked-text fallback used when an
/// instance cannot be expanded.
pub(crate) fn override_text_lines(node: &Node) -> Vec<String> {
    node.symbol_overrides
        .iter()
        .map(|entry| entry.get_path(&["textData", "characters"]).as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Override keys appear either as raw byte runs or wrapped in a record.
fn key_bytes(v: &Value) -> &[u8] {
    match v {
        Value::Bytes(_) => v.as_bytes(),
        _ => v.get("bytes").as_bytes(),
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
