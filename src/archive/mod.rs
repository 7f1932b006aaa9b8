//! Container extraction: locate the trailing directory, decompress the
//! canvas payload, and index raster assets by content hash.

mod compress;
mod container;

use std::collections::{BTreeMap, HashMap};

use crate::foundation::error::{FigError, FigResult};

pub(crate) use compress::decompress_auto;
pub(crate) use container::Container;

/// Canvas payload entry; its absence is fatal.
const CANVAS_ENTRY: &str = "canvas.fig";
const META_ENTRY: &str = "meta.json";
const THUMBNAIL_ENTRY: &str = "thumbnail.png";
const IMAGES_PREFIX: &str = "images/";

/// Everything extracted from a design archive.
pub struct DesignArchive {
    /// Compressed-then-decompressed inner document bytes.
    pub canvas: Vec<u8>,
    /// Raw thumbnail bytes, when present.
    pub thumbnail: Option<Vec<u8>>,
    /// Raster assets keyed by lower-cased content hash (40 hex chars).
    pub images: HashMap<String, Vec<u8>>,
    /// Parsed `meta.json`, empty when absent or malformed.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Non-fatal extraction notes.
    pub warnings: Vec<String>,
}

impl DesignArchive {
    /// Extract an archive from raw file bytes.
    pub fn from_bytes(data: &[u8]) -> FigResult<Self> {
        let container = Container::parse(data)?;

        let mut canvas = None;
        let mut thumbnail = None;
        let mut images = HashMap::new();
        let mut metadata = BTreeMap::new();
        let mut warnings = Vec::new();

        for entry in container.entries() {
            if entry.is_dir() {
                continue;
            }
            match entry.name.as_str() {
                CANVAS_ENTRY => canvas = Some(container.read(entry)?),
                THUMBNAIL_ENTRY => thumbnail = Some(container.read(entry)?),
                META_ENTRY => {
                    let bytes = container.read(entry)?;
                    match serde_json::from_slice::<BTreeMap<String, serde_json::Value>>(&bytes) {
                        Ok(map) => metadata = map,
                        Err(e) => {
                            tracing::warn!("malformed {META_ENTRY}, continuing without: {e}");
                            warnings.push(format!("malformed {META_ENTRY}: {e}"));
                        }
                    }
                }
                name if name.starts_with(IMAGES_PREFIX) => {
                    let hash = name[IMAGES_PREFIX.len()..].to_ascii_lowercase();
                    if !hash.is_empty() {
                        images.insert(hash, container.read(entry)?);
                    }
                }
                _ => {}
            }
        }

        let canvas =
            canvas.ok_or_else(|| FigError::MissingEntry(CANVAS_ENTRY.to_string()))?;

        Ok(Self {
            canvas,
            thumbnail,
            images,
            metadata,
            warnings,
        })
    }

    /// List every non-directory entry name, for diagnostics.
    pub fn list_contents(data: &[u8]) -> FigResult<Vec<String>> {
        let container = Container::parse(data)?;
        Ok(container.names().into_iter().map(str::to_owned).collect())
    }
}
