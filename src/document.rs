use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context as _;

use crate::archive::{DesignArchive, decompress_auto};
use crate::foundation::core::NodeId;
use crate::foundation::error::{FigError, FigResult};
use crate::render::{RenderOptions, RenderedSvg, render_graph};
use crate::scene::{Node, NodeType, SceneGraph};
use crate::schema::CompiledSchema;

/// Inner document magic.
const CANVAS_MAGIC: &[u8; 8] = b"fig-kiwi";

/// A fully loaded design document: the resolved scene graph plus the
/// archive's raster assets and metadata. Stateless and read-only after
/// loading; queries and renders may run concurrently.
#[derive(Debug)]
pub struct Document {
    version: u32,
    graph: SceneGraph,
    images: HashMap<String, Vec<u8>>,
    thumbnail: Option<Vec<u8>>,
    metadata: BTreeMap<String, serde_json::Value>,
    warnings: Vec<String>,
}

impl Document {
    /// Read and parse an archive file.
    pub fn open(path: impl AsRef<Path>) -> FigResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read archive '{}'", path.display()))?;
        Self::from_bytes(&bytes)
    }

    /// Parse an archive from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> FigResult<Self> {
        let archive = DesignArchive::from_bytes(bytes)?;
        let (version, payload) = split_canvas(&archive.canvas)?;

        let schema = CompiledSchema::compile(&payload.schema)?;
        tracing::debug!(version, root = schema.root_name(), "canvas schema compiled");
        let root_value = schema.decode(&payload.data)?;

        let graph = SceneGraph::build(&root_value)?;
        tracing::debug!(nodes = graph.find(None, None).len(), "scene graph built");

        let mut warnings = archive.warnings;
        warnings.extend(graph.warnings().iter().cloned());

        Ok(Self {
            version,
            graph,
            images: archive.images,
            thumbnail: archive.thumbnail,
            metadata: archive.metadata,
            warnings,
        })
    }

    /// Inner document format version (informative).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The DOCUMENT root node.
    pub fn root(&self) -> &Node {
        self.graph.root()
    }

    /// Ordered CANVAS pages.
    pub fn pages(&self) -> Vec<&Node> {
        self.graph.pages()
    }

    /// Resolve a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.get(id)
    }

    /// Resolve a node by either id string form (`a:b` or `a-b`).
    pub fn node_by_str(&self, id: &str) -> FigResult<&Node> {
        let id = NodeId::parse(id)?;
        self.graph
            .get(id)
            .ok_or_else(|| FigError::not_found(format!("node {id}")))
    }

    /// `/`-joined id chain from the root to the node.
    pub fn node_path(&self, id: NodeId) -> Option<&str> {
        self.graph.id_path(id)
    }

    /// Ordered children of a node, including expanded instance clones.
    pub fn children(&self, node: &Node) -> Vec<&Node> {
        self.graph.children(node)
    }

    /// Nodes matching a type tag and/or name substring, in document order.
    pub fn find_nodes(
        &self,
        node_type: Option<NodeType>,
        name_contains: Option<&str>,
    ) -> Vec<&Node> {
        self.graph.find(node_type, name_contains)
    }

    /// Raster bytes by content hash; hex input is case-insensitive.
    pub fn image(&self, hash: &str) -> Option<&[u8]> {
        self.images
            .get(&hash.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Raw `thumbnail.png` bytes when the archive carries one.
    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    /// Parsed `meta.json` entries.
    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Non-fatal notes from extraction and tree building.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Render the subtree rooted at `id` to standalone SVG.
    pub fn render(&self, id: NodeId, opts: &RenderOptions) -> FigResult<RenderedSvg> {
        let idx = self
            .graph
            .index_of(id)
            .ok_or_else(|| FigError::not_found(format!("node {id}")))?;
        render_graph(&self.graph, idx, Some(&self.images), opts)
    }

    /// Render the whole document (root subtree).
    pub fn render_root(&self, opts: &RenderOptions) -> FigResult<RenderedSvg> {
        render_graph(
            &self.graph,
            self.graph.root_index(),
            Some(&self.images),
            opts,
        )
    }
}

#[derive(Debug)]
struct CanvasPayload {
    schema: Vec<u8>,
    data: Vec<u8>,
}

/// Split the canvas entry into its decompressed schema and data chunks.
///
/// Layout: 8-byte magic, u32 version, then two length-prefixed compressed
/// chunks (schema, data).
fn split_canvas(bytes: &[u8]) -> FigResult<(u32, CanvasPayload)> {
    if bytes.len() < 8 || &bytes[..8] != CANVAS_MAGIC {
        return Err(FigError::BadMagic);
    }

    let read_u32 = |pos: usize| -> FigResult<u32> {
        bytes
            .get(pos..pos + 4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .ok_or_else(|| FigError::corrupt(pos, "truncated canvas header"))
    };

    let version = read_u32(8)?;

    let sclen = read_u32(12)? as usize;
    let schema_start: usize = 16;
    let schema_end = schema_start
        .checked_add(sclen)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| FigError::corrupt(12, "schema chunk overruns canvas"))?;
    let schema = decompress_auto(&bytes[schema_start..schema_end])?;

    let dlen = read_u32(schema_end)? as usize;
    let data_start = schema_end + 4;
    let data_end = data_start
        .checked_add(dlen)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| FigError::corrupt(schema_end, "data chunk overruns canvas"))?;
    let data = decompress_auto(&bytes[data_start..data_end])?;

    Ok((version, CanvasPayload { schema, data }))
}
