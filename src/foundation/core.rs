use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{FigError, FigResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Stable node identifier: a `(session, local)` pair unique within a document.
///
/// The canonical string form is `"session:local"`; the dash form
/// `"session-local"` is accepted on input.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId {
    /// Editing-session component.
    pub session: u32,
    /// Session-local counter component.
    pub local: u32,
}

impl NodeId {
    /// Build an id from its two components.
    pub fn new(session: u32, local: u32) -> Self {
        Self { session, local }
    }

    /// Parse either `"a:b"` or `"a-b"`.
    pub fn parse(s: &str) -> FigResult<Self> {
        let sep = if s.contains(':') { ':' } else { '-' };
        let (a, b) = s
            .split_once(sep)
            .ok_or_else(|| FigError::not_found(format!("malformed node id \"{s}\"")))?;
        let session = a
            .trim()
            .parse::<u32>()
            .map_err(|_| FigError::not_found(format!("malformed node id \"{s}\"")))?;
        let local = b
            .trim()
            .parse::<u32>()
            .map_err(|_| FigError::not_found(format!("malformed node id \"{s}\"")))?;
        Ok(Self { session, local })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session, self.local)
    }
}

impl FromStr for NodeId {
    type Err = FigError;

    fn from_str(s: &str) -> FigResult<Self> {
        Self::parse(s)
    }
}

/// Straight-alpha RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    /// Build a color, clamping each channel into `[0, 1]`.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// CSS `rgb(...)` form of the opaque channels (alpha is emitted
    /// separately as `fill-opacity`/`stroke-opacity`).
    pub fn to_rgb_string(self) -> String {
        format!(
            "rgb({},{},{})",
            channel_u8(self.r),
            channel_u8(self.g),
            channel_u8(self.b)
        )
    }
}

fn channel_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
