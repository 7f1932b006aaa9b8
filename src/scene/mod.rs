//! Scene graph: node materialization, tree building, and symbol/instance
//! expansion.

mod build;
mod instance;
mod node;

pub use build::SceneGraph;
pub use node::{
    Baseline, BlendMode, CornerRadius, Effect, EffectKind, GeometryRef, GeometrySource,
    ImageScaleMode, Node, NodeType, Paint, PaintKind, PropNodeField, PropRef, StrokeAlign,
    StrokeCap, StrokeJoin, TextAlignHorizontal, TextStyle, WindingRule,
};

pub(crate) use instance::override_text_lines;
