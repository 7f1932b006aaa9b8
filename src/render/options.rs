use serde::{Deserialize, Serialize};

use crate::foundation::error::{FigError, FigResult};

/// Renderer controls. Every field has a default; unknown keys in the JSON
/// form are rejected rather than ignored.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RenderOptions {
    /// Abort recursion beyond this depth.
    pub max_depth: u32,
    /// Render TEXT nodes.
    pub include_text: bool,
    /// Render solid fills.
    pub include_fills: bool,
    /// Render strokes.
    pub include_strokes: bool,
    /// Embed image paints as base64 data URIs.
    pub include_images: bool,
    /// Emit drop/inner-shadow filters.
    pub include_shadows: bool,
    /// Solid background color, empty for none.
    pub background: String,
    /// Uniform scale applied to the output dimensions.
    pub scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: 200,
            include_text: true,
            include_fills: true,
            include_strokes: true,
            include_images: false,
            include_shadows: true,
            background: String::new(),
            scale: 1.0,
        }
    }
}

impl RenderOptions {
    /// Parse from a JSON object, failing on any unrecognized key.
    pub fn from_json(value: &serde_json::Value) -> FigResult<Self> {
        serde_json::from_value(value.clone()).map_err(|e| FigError::options(e.to_string()))
    }

    pub(crate) fn validate(&self) -> FigResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(FigError::options("scale must be finite and > 0"));
        }
        Ok(())
    }
}
