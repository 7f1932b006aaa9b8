//! Deterministic SVG rendering: two-pass traversal (bounds, then emission)
//! with transform composition, clip/mask scopes, and shadow filters.

mod filters;
mod image;
mod options;
mod svg;
mod text;

pub use options::RenderOptions;
pub use svg::RenderedSvg;

pub(crate) use svg::render_graph;
