//! figtree decodes design-tool archives and renders them to deterministic
//! SVG.
//!
//! The pipeline is archive extraction, schema-driven payload decoding, tree
//! building with symbol/instance expansion, and a two-pass SVG renderer:
//!
//! - Load a [`Document`] from a file or bytes
//! - Query the scene graph by [`NodeId`], type, or name
//! - Render any subtree with [`Document::render`] and [`RenderOptions`]
#![forbid(unsafe_code)]

mod archive;
mod document;
mod foundation;
mod geometry;
mod render;
mod scene;
mod schema;

pub use crate::archive::DesignArchive;
pub use crate::document::Document;
pub use crate::foundation::core::{Affine, Color, NodeId, Point, Rect, Vec2};
pub use crate::foundation::error::{FigError, FigResult};
pub use crate::geometry::PathCommand;
pub use crate::render::{RenderOptions, RenderedSvg};
pub use crate::scene::{
    Baseline, BlendMode, CornerRadius, Effect, EffectKind, GeometryRef, GeometrySource,
    ImageScaleMode, Node, NodeType, Paint, PaintKind, PropNodeField, PropRef, SceneGraph,
    StrokeAlign, StrokeCap, StrokeJoin, TextAlignHorizontal, TextStyle, WindingRule,
};
pub use crate::schema::Value;
