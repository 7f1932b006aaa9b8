use std::collections::HashMap;

use crate::foundation::core::NodeId;
use crate::foundation::error::{FigError, FigResult};
use crate::scene::instance::expand_instances;
use crate::scene::node::{Node, NodeType};
use crate::schema::Value;

/// The resolved document tree: an arena of nodes with index-based children
/// plus id lookups. Read-only once built.
#[derive(Debug)]
pub struct SceneGraph {
    pub(crate) arena: Vec<Node>,
    pub(crate) root: usize,
    pub(crate) by_id: HashMap<NodeId, usize>,
    pub(crate) id_paths: HashMap<NodeId, String>,
    pub(crate) blobs: Vec<Vec<u8>>,
    pub(crate) warnings: Vec<String>,
}

impl SceneGraph {
    /// Build the tree from the decoded root message: materialize every
    /// change record, wire children by parent id in position order, index,
    /// then expand instances.
    pub(crate) fn build(root_value: &Value) -> FigResult<Self> {
        let blobs: Vec<Vec<u8>> = root_value
            .get("blobs")
            .as_array()
            .iter()
            .map(|b| b.get("bytes").as_bytes().to_vec())
            .collect();

        let mut arena = Vec::new();
        let mut by_id: HashMap<NodeId, usize> = HashMap::new();
        let mut warnings = Vec::new();

        for change in root_value.get("nodeChanges").as_array() {
            let Some(node) = Node::from_change(change) else {
                warnings.push("node change without an id skipped".to_string());
                continue;
            };
            if by_id.contains_key(&node.id) {
                tracing::warn!("duplicate node id {}, keeping first", node.id);
                warnings.push(format!("duplicate node id {}", node.id));
                continue;
            }
            by_id.insert(node.id, arena.len());
            arena.push(node);
        }

        let root = find_root(&arena, &mut warnings)?;
        wire_children(&mut arena, &by_id, root, &mut warnings);

        // Unreachable nodes (orphans and anything behind a parent cycle)
        // are dropped from the id index.
        let id_paths = build_id_paths(&arena, root);
        by_id.retain(|id, _| id_paths.contains_key(id));

        let mut graph = Self {
            arena,
            root,
            by_id,
            id_paths,
            blobs,
            warnings,
        };
        expand_instances(&mut graph);
        Ok(graph)
    }

    pub fn root(&self) -> &Node {
        &self.arena[self.root]
    }

    pub(crate) fn root_index(&self) -> usize {
        self.root
    }

    pub(crate) fn node_at(&self, idx: usize) -> &Node {
        &self.arena[idx]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id).map(|&idx| &self.arena[idx])
    }

    pub(crate) fn index_of(&self, id: NodeId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// `/`-joined id chain from the root down to `id`.
    pub fn id_path(&self, id: NodeId) -> Option<&str> {
        self.id_paths.get(&id).map(String::as_str)
    }

    /// Ordered children of a node from this graph.
    pub fn children(&self, node: &Node) -> Vec<&Node> {
        node.children()
            .iter()
            .map(|&idx| &self.arena[idx])
            .collect()
    }

    /// Ordered CANVAS children of the document root.
    pub fn pages(&self) -> Vec<&Node> {
        self.root()
            .children()
            .iter()
            .map(|&idx| &self.arena[idx])
            .filter(|n| n.node_type == NodeType::Canvas)
            .collect()
    }

    /// Nodes matching a type tag and/or a case-sensitive name substring, in
    /// document order.
    pub fn find(&self, node_type: Option<NodeType>, name_contains: Option<&str>) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        // Depth-first with children pushed in reverse keeps document order.
        while let Some(idx) = stack.pop() {
            let node = &self.arena[idx];
            let type_ok = node_type.is_none_or(|t| node.node_type == t);
            let name_ok = name_contains.is_none_or(|s| node.name.contains(s));
            if type_ok && name_ok {
                out.push(node);
            }
            for &child in node.children().iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub(crate) fn blob(&self, idx: usize) -> Option<&[u8]> {
        self.blobs.get(idx).map(Vec::as_slice)
    }

    /// Non-fatal notes collected during the build.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

fn find_root(arena: &[Node], warnings: &mut Vec<String>) -> FigResult<usize> {
    let mut roots = arena
        .iter()
        .enumerate()
        .filter(|(_, n)| n.node_type == NodeType::Document)
        .map(|(i, _)| i);
    let root = roots
        .next()
        .ok_or_else(|| FigError::schema_mismatch("document has no DOCUMENT node"))?;
    if roots.next().is_some() {
        warnings.push("multiple DOCUMENT nodes, using the first".to_string());
    }
    Ok(root)
}

fn wire_children(
    arena: &mut [Node],
    by_id: &HashMap<NodeId, usize>,
    root: usize,
    warnings: &mut Vec<String>,
) {
    let mut buckets: HashMap<usize, Vec<usize>> = HashMap::new();
    for (idx, node) in arena.iter().enumerate() {
        if idx == root {
            continue;
        }
        match node.parent.and_then(|pid| by_id.get(&pid).copied()) {
            Some(parent_idx) if parent_idx != idx => {
                buckets.entry(parent_idx).or_default().push(idx);
            }
            _ => {
                tracing::warn!("orphan node {} ({:?}) dropped", node.id, node.node_type);
                warnings.push(format!("orphan node {} dropped", node.id));
            }
        }
    }

    for (parent_idx, mut kids) in buckets {
        // Stable sort on the ordering token keeps record order for ties.
        kids.sort_by(|&a, &b| arena[a].position.cmp(&arena[b].position));
        arena[parent_idx].children = kids;
    }
}

fn build_id_paths(arena: &[Node], root: usize) -> HashMap<NodeId, String> {
    let mut paths = HashMap::new();
    let mut stack: Vec<(usize, String)> = vec![(root, arena[root].id.to_string())];
    while let Some((idx, path)) = stack.pop() {
        if paths.contains_key(&arena[idx].id) {
            continue; // parent cycle guard
        }
        for &child in arena[idx].children() {
            let child_path = format!("{path}/{}", arena[child].id);
            stack.push((child, child_path));
        }
        paths.insert(arena[idx].id, path);
    }
    paths
}
