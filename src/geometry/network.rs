use kurbo::{Point, Vec2};

use crate::foundation::error::{FigError, FigResult};
use crate::geometry::path::PathCommand;
use crate::schema::Value;

/// Vertex/segment ceiling; anything larger is assumed corrupt.
pub(crate) const NETWORK_CEILING: usize = 1000;
/// Vertices may exceed the normalized size by this much before the decode
/// is rejected.
pub(crate) const NETWORK_TOLERANCE: f64 = 2.0;
/// Chain endpoints closer than this close the subpath.
const CLOSE_EPSILON: f64 = 1e-2;

const VERTEX_STRIDE: usize = 12;
const SEGMENT_STRIDE: usize = 28;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NetworkVertex {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NetworkSegment {
    pub(crate) start: usize,
    pub(crate) start_handle: Vec2,
    pub(crate) end: usize,
    pub(crate) end_handle: Vec2,
}

/// The vertex + segment graph form of a vector's geometry.
///
/// Regions are counted in the wire form but not decoded; only the segment
/// list drives centerline reconstruction.
#[derive(Clone, Debug, Default)]
pub(crate) struct VectorNetwork {
    pub(crate) vertices: Vec<NetworkVertex>,
    pub(crate) segments: Vec<NetworkSegment>,
}

impl VectorNetwork {
    /// Decode the binary blob layout: three u32 counts, then fixed-stride
    /// vertex and segment tables.
    pub(crate) fn decode(bytes: &[u8]) -> FigResult<Self> {
        if bytes.len() < 12 {
            return Err(FigError::corrupt(0, "vector network shorter than header"));
        }
        let vertex_count = u32_at(bytes, 0) as usize;
        let segment_count = u32_at(bytes, 4) as usize;
        let _region_count = u32_at(bytes, 8) as usize;

        let need = 12 + vertex_count
            .checked_mul(VERTEX_STRIDE)
            .and_then(|v| segment_count.checked_mul(SEGMENT_STRIDE).map(|s| v + s))
            .ok_or_else(|| FigError::corrupt(0, "vector network counts overflow"))?;
        if need > bytes.len() {
            return Err(FigError::corrupt(
                0,
                format!("vector network needs {need} bytes, has {}", bytes.len()),
            ));
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        let mut pos = 12;
        for _ in 0..vertex_count {
            // Per-vertex style word is unused by the centerline pass.
            vertices.push(NetworkVertex {
                x: f32_at(bytes, pos + 4),
                y: f32_at(bytes, pos + 8),
            });
            pos += VERTEX_STRIDE;
        }

        let mut segments = Vec::with_capacity(segment_count);
        for _ in 0..segment_count {
            let start = u32_at(bytes, pos + 4) as usize;
            let end = u32_at(bytes, pos + 16) as usize;
            if start >= vertex_count || end >= vertex_count {
                return Err(FigError::corrupt(pos, "segment vertex index out of range"));
            }
            segments.push(NetworkSegment {
                start,
                start_handle: Vec2::new(f32_at(bytes, pos + 8), f32_at(bytes, pos + 12)),
                end,
                end_handle: Vec2::new(f32_at(bytes, pos + 20), f32_at(bytes, pos + 24)),
            });
            pos += SEGMENT_STRIDE;
        }

        Ok(Self { vertices, segments })
    }

    /// Build the structured inline form carried directly on a node. Returns
    /// `None` when the value has no vertices.
    pub(crate) fn from_value(value: &Value) -> Option<Self> {
        let vertex_values = value.get("vertices").as_array();
        if vertex_values.is_empty() {
            return None;
        }
        let vertices: Vec<NetworkVertex> = vertex_values
            .iter()
            .map(|v| NetworkVertex {
                x: v.get("x").as_f64(),
                y: v.get("y").as_f64(),
            })
            .collect();

        let mut segments = Vec::new();
        for seg in value.get("segments").as_array() {
            let start = seg.get("startVertex").as_u64() as usize;
            let end = seg.get("endVertex").as_u64() as usize;
            if start >= vertices.len() || end >= vertices.len() {
                return None;
            }
            segments.push(NetworkSegment {
                start,
                start_handle: Vec2::new(
                    seg.get("startDx").as_f64(),
                    seg.get("startDy").as_f64(),
                ),
                end,
                end_handle: Vec2::new(seg.get("endDx").as_f64(), seg.get("endDy").as_f64()),
            });
        }
        Some(Self { vertices, segments })
    }

    /// Sanity-check against the node's normalized size. A network is usable
    /// when it stays inside the padded box and under the size ceiling.
    pub(crate) fn is_plausible(&self, size: Vec2) -> bool {
        if self.vertices.len() > NETWORK_CEILING || self.segments.len() > NETWORK_CEILING {
            return false;
        }
        self.vertices.iter().all(|v| {
            v.x >= -NETWORK_TOLERANCE
                && v.y >= -NETWORK_TOLERANCE
                && v.x <= size.x + NETWORK_TOLERANCE
                && v.y <= size.y + NETWORK_TOLERANCE
        })
    }

    /// Reconstruct the stroke centerline by chaining segments end-to-start.
    ///
    /// Chain breaks start a new subpath; degenerate segments (start == end
    /// vertex) are dropped; a subpath returning to its first point within
    /// `1e-2` is closed.
    pub(crate) fn centerline(&self) -> Vec<PathCommand> {
        let mut out = Vec::new();
        let mut used = vec![false; self.segments.len()];

        loop {
            let Some(first) = (0..self.segments.len())
                .find(|&i| !used[i] && self.segments[i].start != self.segments[i].end)
            else {
                break;
            };

            let subpath_start = self.point(self.segments[first].start);
            out.push(PathCommand::MoveTo(subpath_start));
            let mut cursor = self.emit_segment(first, &mut out, &mut used);

            loop {
                let next = (0..self.segments.len()).find(|&i| {
                    !used[i]
                        && self.segments[i].start != self.segments[i].end
                        && self.segments[i].start == cursor
                });
                match next {
                    Some(i) => cursor = self.emit_segment(i, &mut out, &mut used),
                    None => break,
                }
            }

            let end_point = self.point(cursor);
            if (end_point - subpath_start).hypot() <= CLOSE_EPSILON {
                out.push(PathCommand::Close);
            }
        }

        out
    }

    fn emit_segment(&self, idx: usize, out: &mut Vec<PathCommand>, used: &mut [bool]) -> usize {
        used[idx] = true;
        let seg = &self.segments[idx];
        let v0 = self.point(seg.start);
        let v1 = self.point(seg.end);
        let straight = seg.start_handle == Vec2::ZERO && seg.end_handle == Vec2::ZERO;
        if straight {
            out.push(PathCommand::LineTo(v1));
        } else {
            out.push(PathCommand::CubicTo(
                v0 + seg.start_handle,
                v1 + seg.end_handle,
                v1,
            ));
        }
        seg.end
    }

    fn point(&self, idx: usize) -> Point {
        Point::new(self.vertices[idx].x, self.vertices[idx].y)
    }
}

fn u32_at(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
}

fn f32_at(bytes: &[u8], pos: usize) -> f64 {
    f64::from(f32::from_le_bytes([
        bytes[pos],
        bytes[pos + 1],
        bytes[pos + 2],
        bytes[pos + 3],
    ]))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/network.rs"]
mod tests;
