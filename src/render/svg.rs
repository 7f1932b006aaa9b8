use std::collections::HashMap;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::foundation::error::FigResult;
use crate::geometry::{
    PathCommand, VectorNetwork, command_bounds, decode_command_blob, has_drawable,
};
use crate::render::filters::compose_filter;
use crate::render::image::{data_uri, preserve_aspect_ratio};
use crate::render::options::RenderOptions;
use crate::render::text::emit_text;
use crate::scene::{
    BlendMode, CornerRadius, GeometryRef, GeometrySource, Node, NodeType, PaintKind, SceneGraph,
    StrokeAlign, StrokeCap, StrokeJoin, WindingRule,
};

/// Tolerance for treating transformed rectangle edges as axis-aligned.
const AXIS_EPSILON: f64 = 1e-2;
/// Line advance for the stacked-text instance fallback.
const FALLBACK_LINE_HEIGHT: f64 = 16.0;

/// A finished render: standalone markup plus the content box and any
/// non-fatal notes.
#[derive(Clone, Debug)]
pub struct RenderedSvg {
    pub svg: String,
    pub width: f64,
    pub height: f64,
    pub warnings: Vec<String>,
}

/// Render the subtree rooted at `root_idx` to standalone SVG.
pub(crate) fn render_graph(
    graph: &SceneGraph,
    root_idx: usize,
    images: Option<&HashMap<String, Vec<u8>>>,
    opts: &RenderOptions,
) -> FigResult<RenderedSvg> {
    opts.validate()?;

    let mut bounds = None;
    collect_bounds(graph, root_idx, Affine::IDENTITY, 0, opts, &mut bounds);
    let Some(bounds) = bounds else {
        return Ok(RenderedSvg {
            svg: String::new(),
            width: 0.0,
            height: 0.0,
            warnings: vec!["no bounds".to_string()],
        });
    };

    let mut renderer = Renderer {
        graph,
        images,
        opts,
        defs: String::new(),
        body: String::new(),
        warnings: Vec::new(),
        filter_seq: 0,
        clip_seq: 0,
    };
    renderer.render_node(root_idx, Affine::IDENTITY, 0);

    let width = bounds.width();
    let height = bounds.height();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        fmt_f64(width * opts.scale),
        fmt_f64(height * opts.scale),
        fmt_f64(width),
        fmt_f64(height),
    );
    if !opts.background.is_empty() {
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&opts.background)
        ));
    }
    if !renderer.defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&renderer.defs);
        svg.push_str("</defs>");
    }
    // Shift content so the bounds' min corner lands at the origin.
    if bounds.x0 != 0.0 || bounds.y0 != 0.0 {
        svg.push_str(&format!(
            "<g transform=\"translate({} {})\">",
            fmt_f64(-bounds.x0),
            fmt_f64(-bounds.y0)
        ));
        svg.push_str(&renderer.body);
        svg.push_str("</g>");
    } else {
        svg.push_str(&renderer.body);
    }
    svg.push_str("</svg>");

    Ok(RenderedSvg {
        svg,
        width: width * opts.scale,
        height: height * opts.scale,
        warnings: renderer.warnings,
    })
}

/// Bounds pass: union the transformed corners of every visible node that is
/// not a DOCUMENT or CANVAS.
fn collect_bounds(
    graph: &SceneGraph,
    idx: usize,
    parent_world: Affine,
    depth: u32,
    opts: &RenderOptions,
    out: &mut Option<Rect>,
) {
    let node = graph.node_at(idx);
    if !node.visible || depth > opts.max_depth {
        return;
    }
    let world = parent_world * node.local_transform();

    if !matches!(node.node_type, NodeType::Document | NodeType::Canvas) {
        for corner in rect_corners(node.size()) {
            let p = world * corner;
            *out = Some(match *out {
                Some(r) => r.union_pt(p),
                None => Rect::from_points(p, p),
            });
        }
    }

    for &child in node.children() {
        collect_bounds(graph, child, world, depth + 1, opts, out);
    }
}

fn rect_corners(size: Vec2) -> [Point; 4] {
    [
        Point::new(0.0, 0.0),
        Point::new(size.x, 0.0),
        Point::new(size.x, size.y),
        Point::new(0.0, size.y),
    ]
}

struct Renderer<'a> {
    graph: &'a SceneGraph,
    images: Option<&'a HashMap<String, Vec<u8>>>,
    opts: &'a RenderOptions,
    defs: String,
    body: String,
    warnings: Vec<String>,
    filter_seq: u32,
    clip_seq: u32,
}

impl Renderer<'_> {
    fn next_filter_id(&mut self) -> String {
        let id = format!("filter{}", self.filter_seq);
        self.filter_seq += 1;
        id
    }

    fn next_clip_id(&mut self) -> String {
        let id = format!("clip{}", self.clip_seq);
        self.clip_seq += 1;
        id
    }

    fn render_node(&mut self, idx: usize, parent_world: Affine, depth: u32) {
        let node = self.graph.node_at(idx);
        if !node.visible {
            return;
        }
        if depth > self.opts.max_depth {
            self.warnings
                .push(format!("max depth exceeded at node {}", node.id));
            return;
        }
        let world = parent_world * node.local_transform();

        if !matches!(node.blend_mode, BlendMode::Normal | BlendMode::PassThrough) {
            self.warnings.push(format!(
                "blend mode {:?} on {} rendered as normal",
                node.blend_mode, node.id
            ));
        }

        // Effects wrap the node and all of its descendants.
        let mut wrappers = 0usize;
        if !node.effects.is_empty() && self.opts.include_shadows {
            let id = self.next_filter_id();
            if let Some(filter) = compose_filter(&id, &node.effects, &mut self.warnings) {
                self.defs.push_str(&filter);
                self.body.push_str(&format!("<g filter=\"url(#{id})\">"));
                wrappers += 1;
            } else {
                // Nothing renderable in the effect list; release the id so
                // output stays dense and deterministic.
                self.filter_seq -= 1;
            }
        }
        if node.opacity < 1.0 {
            self.body
                .push_str(&format!("<g opacity=\"{}\">", fmt_f64(node.opacity)));
            wrappers += 1;
        }

        self.emit_primitive(idx, world);
        self.render_children(idx, world, depth);

        for _ in 0..wrappers {
            self.body.push_str("</g>");
        }
    }

    fn emit_primitive(&mut self, idx: usize, world: Affine) {
        let node = self.graph.node_at(idx);
        match node.node_type {
            NodeType::Document | NodeType::Canvas | NodeType::Slice => {}
            NodeType::Text => {
                if self.opts.include_text && !node.characters.is_empty() {
                    self.emit_text_node(node, world);
                }
            }
            NodeType::Instance if node.children().is_empty() => {
                self.emit_instance_fallback(node, world);
            }
            t if t.is_shape() => self.emit_shape(node, world),
            _ => self.emit_rect_like(node, world),
        }
    }

    /// Rectangles and containers: solid fills as rects (or four-point paths
    /// when rotated), image fills as embedded rasters, strokes as an
    /// unfilled rect outline.
    fn emit_rect_like(&mut self, node: &Node, world: Affine) {
        if node.width <= 0.0 || node.height <= 0.0 {
            return;
        }
        for paint in &node.fills {
            if !paint.visible {
                continue;
            }
            match &paint.kind {
                PaintKind::Solid => {
                    if self.opts.include_fills {
                        let markup = rect_markup(
                            node,
                            world,
                            &format!(
                                " fill=\"{}\"{}",
                                paint.color.to_rgb_string(),
                                opacity_attr("fill-opacity", paint.color.a * paint.opacity)
                            ),
                        );
                        self.body.push_str(&markup);
                    }
                }
                PaintKind::Image { hash, scale_mode } => {
                    if !self.opts.include_images {
                        continue;
                    }
                    let Some(bytes) = self.lookup_image(hash) else {
                        self.warnings
                            .push(format!("image bytes missing for node {}", node.id));
                        continue;
                    };
                    self.body.push_str(&format!(
                        "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"{}\" transform=\"{}\" href=\"{}\"/>",
                        fmt_f64(node.width),
                        fmt_f64(node.height),
                        preserve_aspect_ratio(*scale_mode),
                        matrix_attr(world),
                        data_uri(bytes),
                    ));
                }
                PaintKind::Unrenderable(kind) => {
                    self.warnings
                        .push(format!("unrenderable paint {kind} on node {}", node.id));
                }
            }
        }

        if self.opts.include_strokes
            && let Some(stroke) = node.visible_stroke()
        {
            match &stroke.kind {
                PaintKind::Solid => {
                    let markup = rect_markup(
                        node,
                        world,
                        &format!(" fill=\"none\"{}", self.stroke_attrs(node)),
                    );
                    self.body.push_str(&markup);
                }
                PaintKind::Image { .. } | PaintKind::Unrenderable(_) => {
                    self.warnings
                        .push(format!("unrenderable stroke paint on node {}", node.id));
                }
            }
        }
    }

    /// Vector shapes: filled geometry scaled into the node box, strokes via
    /// the reconstructed centerline with the diagonal fallback.
    fn emit_shape(&mut self, node: &Node, world: Affine) {
        let stroke = if self.opts.include_strokes {
            node.visible_stroke()
                .filter(|p| matches!(p.kind, PaintKind::Solid))
        } else {
            None
        };

        for paint in node.fills.iter().filter(|p| p.visible) {
            if let PaintKind::Unrenderable(kind) = &paint.kind {
                self.warnings
                    .push(format!("unrenderable paint {kind} on node {}", node.id));
            }
        }

        if let Some(paint) = node.solid_fill().filter(|_| self.opts.include_fills) {
            match self.first_decodable(&node.fill_geometry) {
                Some((cmds, winding)) if has_drawable(&cmds) => {
                    let transform = fit_transform(&cmds, node.size(), world);
                    let mut attrs = format!(
                        " fill=\"{}\"{}",
                        paint.color.to_rgb_string(),
                        opacity_attr("fill-opacity", paint.color.a * paint.opacity)
                    );
                    if winding == WindingRule::EvenOdd {
                        attrs.push_str(" fill-rule=\"evenodd\"");
                    }
                    if stroke.is_some() {
                        attrs.push_str(&self.stroke_attrs(node));
                    }
                    self.body.push_str(&format!(
                        "<path d=\"{}\" transform=\"{}\"{attrs}/>",
                        path_data(&cmds),
                        matrix_attr(transform),
                    ));
                    return;
                }
                Some(_) => {}
                None => {
                    if !node.fill_geometry.is_empty() {
                        self.warnings
                            .push(format!("fill geometry undecodable on node {}", node.id));
                    }
                }
            }
        }

        if let Some(_stroke) = stroke {
            let cmds = self.stroke_centerline(node);
            let mut open_clip = false;
            if node.stroke_align == StrokeAlign::Inside
                && let Some((fill_cmds, _)) = self.first_decodable(&node.fill_geometry)
                && has_drawable(&fill_cmds)
            {
                let clip_id = self.next_clip_id();
                let transform = fit_transform(&fill_cmds, node.size(), world);
                self.defs.push_str(&format!(
                    "<clipPath id=\"{clip_id}\"><path d=\"{}\" transform=\"{}\"/></clipPath>",
                    path_data(&fill_cmds),
                    matrix_attr(transform),
                ));
                self.body
                    .push_str(&format!("<g clip-path=\"url(#{clip_id})\">"));
                open_clip = true;
            }
            self.body.push_str(&format!(
                "<path d=\"{}\" transform=\"{}\" fill=\"none\"{}/>",
                path_data(&cmds),
                matrix_attr(world),
                self.stroke_attrs(node),
            ));
            if open_clip {
                self.body.push_str("</g>");
            }
        }
    }

    /// Centerline command sequence for a stroked shape. Decode failures are
    /// warned about; a shape with no geometry at all falls back silently.
    fn stroke_centerline(&mut self, node: &Node) -> Vec<PathCommand> {
        if let Some(inline) = &node.inline_network {
            if let Some(net) = VectorNetwork::from_value(inline) {
                if net.is_plausible(node.size()) {
                    let cmds = net.centerline();
                    if !cmds.is_empty() {
                        return cmds;
                    }
                } else {
                    self.warnings.push(format!(
                        "inline vector network rejected on node {}",
                        node.id
                    ));
                }
            } else {
                self.warnings
                    .push(format!("inline vector network malformed on node {}", node.id));
            }
        }

        if let Some(blob_idx) = node.vector_network_blob {
            match self.graph.blob(blob_idx).map(VectorNetwork::decode) {
                Some(Ok(net)) if net.is_plausible(node.size()) => {
                    let cmds = net.centerline();
                    if !cmds.is_empty() {
                        return cmds;
                    }
                }
                Some(Ok(_)) => self.warnings.push(format!(
                    "vector network out of bounds on node {}",
                    node.id
                )),
                Some(Err(e)) => self
                    .warnings
                    .push(format!("vector network blob on node {}: {e}", node.id)),
                None => self
                    .warnings
                    .push(format!("blob index {blob_idx} out of range on node {}", node.id)),
            }
        }

        vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(node.width, node.height)),
        ]
    }

    fn emit_text_node(&mut self, node: &Node, world: Affine) {
        let (fill, fill_opacity) = match node.solid_fill() {
            Some(p) => (p.color.to_rgb_string(), p.color.a * p.opacity),
            None => ("rgb(0,0,0)".to_string(), 1.0),
        };
        for paint in node.fills.iter().filter(|p| p.visible) {
            if let PaintKind::Unrenderable(kind) = &paint.kind {
                self.warnings
                    .push(format!("unrenderable paint {kind} on node {}", node.id));
            }
        }
        let origin = world * Point::new(0.0, 0.0);
        self.body
            .push_str(&emit_text(node, origin, &fill, fill_opacity));
    }

    /// Unexpanded instance: one text line per textual override, stacked by
    /// a default line height.
    fn emit_instance_fallback(&mut self, node: &Node, world: Affine) {
        let lines = crate::scene::override_text_lines(node);
        if lines.is_empty() {
            self.warnings.push(format!(
                "instance {} has no symbol and no textual overrides",
                node.id
            ));
            return;
        }
        let origin = world * Point::new(0.0, 0.0);
        for (i, line) in lines.iter().enumerate() {
            let y = origin.y + FALLBACK_LINE_HEIGHT * (i + 1) as f64;
            self.body.push_str(&format!(
                "<text x=\"{}\" y=\"{}\" fill=\"rgb(0,0,0)\">{}</text>",
                fmt_f64(origin.x),
                fmt_f64(y),
                escape_xml(line)
            ));
        }
    }

    fn render_children(&mut self, idx: usize, world: Affine, depth: u32) {
        let node = self.graph.node_at(idx);
        let children: Vec<usize> = node.children().to_vec();
        if children.is_empty() {
            return;
        }

        let mut wrappers = 0usize;
        if node.clips_content && node.width > 0.0 && node.height > 0.0 {
            let clip_id = self.next_clip_id();
            self.defs.push_str(&format!(
                "<clipPath id=\"{clip_id}\"><rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" transform=\"{}\"/></clipPath>",
                fmt_f64(node.width),
                fmt_f64(node.height),
                matrix_attr(world),
            ));
            self.body
                .push_str(&format!("<g clip-path=\"url(#{clip_id})\">"));
            wrappers += 1;
        }

        let mut mask_open = false;
        for child_idx in children {
            let child = self.graph.node_at(child_idx);
            if child.is_mask && child.visible {
                if mask_open {
                    self.body.push_str("</g>");
                }
                let child_world = world * child.local_transform();
                let clip_id = self.emit_mask_clip(child, child_world);
                self.body
                    .push_str(&format!("<g clip-path=\"url(#{clip_id})\">"));
                mask_open = true;
                continue;
            }
            self.render_node(child_idx, world, depth + 1);
        }
        if mask_open {
            self.body.push_str("</g>");
        }

        for _ in 0..wrappers {
            self.body.push_str("</g>");
        }
    }

    /// Clip region for a mask sibling: its fill geometry when decodable,
    /// else its axis-aligned box.
    fn emit_mask_clip(&mut self, mask: &Node, world: Affine) -> String {
        let clip_id = self.next_clip_id();
        match self.first_decodable(&mask.fill_geometry) {
            Some((cmds, _)) if has_drawable(&cmds) => {
                let transform = fit_transform(&cmds, mask.size(), world);
                self.defs.push_str(&format!(
                    "<clipPath id=\"{clip_id}\"><path d=\"{}\" transform=\"{}\"/></clipPath>",
                    path_data(&cmds),
                    matrix_attr(transform),
                ));
            }
            _ => {
                self.defs.push_str(&format!(
                    "<clipPath id=\"{clip_id}\"><rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" transform=\"{}\"/></clipPath>",
                    fmt_f64(mask.width),
                    fmt_f64(mask.height),
                    matrix_attr(world),
                ));
            }
        }
        clip_id
    }

    /// First geometry reference that decodes to a non-empty sequence.
    fn first_decodable(&self, refs: &[GeometryRef]) -> Option<(Vec<PathCommand>, WindingRule)> {
        for geometry in refs {
            let cmds = match &geometry.source {
                GeometrySource::Inline(cmds) => cmds.clone(),
                GeometrySource::Blob(idx) => match self.graph.blob(*idx) {
                    Some(bytes) => decode_command_blob(bytes),
                    None => continue,
                },
            };
            if !cmds.is_empty() {
                return Some((cmds, geometry.winding));
            }
        }
        None
    }

    fn stroke_attrs(&self, node: &Node) -> String {
        let Some(stroke) = node.visible_stroke() else {
            return String::new();
        };
        let mut attrs = format!(
            " stroke=\"{}\"{} stroke-width=\"{}\"",
            stroke.color.to_rgb_string(),
            opacity_attr("stroke-opacity", stroke.color.a * stroke.opacity),
            fmt_f64(node.stroke_weight),
        );
        match node.stroke_cap {
            StrokeCap::None => {}
            StrokeCap::Round => attrs.push_str(" stroke-linecap=\"round\""),
            StrokeCap::Square => attrs.push_str(" stroke-linecap=\"square\""),
        }
        match node.stroke_join {
            StrokeJoin::Miter => {}
            StrokeJoin::Bevel => attrs.push_str(" stroke-linejoin=\"bevel\""),
            StrokeJoin::Round => attrs.push_str(" stroke-linejoin=\"round\""),
        }
        if !node.dash_pattern.is_empty() {
            let dashes: Vec<String> = node.dash_pattern.iter().map(|d| fmt_f64(*d)).collect();
            attrs.push_str(&format!(" stroke-dasharray=\"{}\"", dashes.join(" ")));
        }
        attrs
    }

    fn lookup_image(&self, hash: &[u8]) -> Option<&[u8]> {
        let key: String = hash.iter().map(|b| format!("{b:02x}")).collect();
        self.images?.get(&key).map(Vec::as_slice)
    }
}

/// Rectangle markup for a node box under `world`: a `<rect>` when the
/// transformed edges stay axis-aligned, else a closed four-point path.
fn rect_markup(node: &Node, world: Affine, paint_attrs: &str) -> String {
    let corners = rect_corners(node.size()).map(|p| world * p);
    let axis_aligned = (corners[0].y - corners[1].y).abs() <= AXIS_EPSILON
        && (corners[1].x - corners[2].x).abs() <= AXIS_EPSILON;

    if !axis_aligned {
        let d = format!(
            "M{} {}L{} {}L{} {}L{} {}Z",
            fmt_f64(corners[0].x),
            fmt_f64(corners[0].y),
            fmt_f64(corners[1].x),
            fmt_f64(corners[1].y),
            fmt_f64(corners[2].x),
            fmt_f64(corners[2].y),
            fmt_f64(corners[3].x),
            fmt_f64(corners[3].y),
        );
        return format!("<path d=\"{d}\"{paint_attrs}/>");
    }

    let x = corners[0].x.min(corners[2].x);
    let y = corners[0].y.min(corners[2].y);
    let w = (corners[1].x - corners[0].x).abs();
    let h = (corners[3].y - corners[0].y).abs();
    let sx = if node.width > 0.0 { w / node.width } else { 1.0 };
    let sy = if node.height > 0.0 { h / node.height } else { 1.0 };

    // Clamp before emission so stadiums stay stadium-shaped; the output
    // substrate's own rx/ry clamping would taper them instead.
    let max_radius = node.width.min(node.height) / 2.0;
    match node.corner_radius {
        CornerRadius::Uniform(r) if r > 0.0 => {
            let r = r.min(max_radius);
            format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\"{paint_attrs}/>",
                fmt_f64(x),
                fmt_f64(y),
                fmt_f64(w),
                fmt_f64(h),
                fmt_f64(r * sx),
                fmt_f64(r * sy),
            )
        }
        CornerRadius::PerCorner(radii) => {
            let d = rounded_rect_path(x, y, w, h, radii.map(|r| r.min(max_radius) * sx));
            format!("<path d=\"{d}\"{paint_attrs}/>")
        }
        _ => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{paint_attrs}/>",
            fmt_f64(x),
            fmt_f64(y),
            fmt_f64(w),
            fmt_f64(h),
        ),
    }
}

/// Rounded-rect path with per-corner radii, clockwise from top-left.
fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, [tl, tr, br, bl]: [f64; 4]) -> String {
    let mut d = String::new();
    d.push_str(&format!("M{} {}", fmt_f64(x + tl), fmt_f64(y)));
    d.push_str(&format!("L{} {}", fmt_f64(x + w - tr), fmt_f64(y)));
    if tr > 0.0 {
        d.push_str(&format!(
            "A{} {} 0 0 1 {} {}",
            fmt_f64(tr),
            fmt_f64(tr),
            fmt_f64(x + w),
            fmt_f64(y + tr)
        ));
    }
    d.push_str(&format!("L{} {}", fmt_f64(x + w), fmt_f64(y + h - br)));
    if br > 0.0 {
        d.push_str(&format!(
            "A{} {} 0 0 1 {} {}",
            fmt_f64(br),
            fmt_f64(br),
            fmt_f64(x + w - br),
            fmt_f64(y + h)
        ));
    }
    d.push_str(&format!("L{} {}", fmt_f64(x + bl), fmt_f64(y + h)));
    if bl > 0.0 {
        d.push_str(&format!(
            "A{} {} 0 0 1 {} {}",
            fmt_f64(bl),
            fmt_f64(bl),
            fmt_f64(x),
            fmt_f64(y + h - bl)
        ));
    }
    d.push_str(&format!("L{} {}", fmt_f64(x), fmt_f64(y + tl)));
    if tl > 0.0 {
        d.push_str(&format!(
            "A{} {} 0 0 1 {} {}",
            fmt_f64(tl),
            fmt_f64(tl),
            fmt_f64(x + tl),
            fmt_f64(y)
        ));
    }
    d.push('Z');
    d
}

/// Compose `world` with the normalization that scales a path's command
/// bounds onto the node box.
fn fit_transform(cmds: &[PathCommand], size: Vec2, world: Affine) -> Affine {
    let Some(bounds) = command_bounds(cmds) else {
        return world;
    };
    let sx = if bounds.width() > 1e-9 {
        size.x / bounds.width()
    } else {
        1.0
    };
    let sy = if bounds.height() > 1e-9 {
        size.y / bounds.height()
    } else {
        1.0
    };
    world
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate(Vec2::new(-bounds.x0, -bounds.y0))
}

pub(crate) fn path_data(cmds: &[PathCommand]) -> String {
    let mut d = String::new();
    for cmd in cmds {
        match *cmd {
            PathCommand::Close => d.push('Z'),
            PathCommand::MoveTo(p) => {
                d.push_str(&format!("M{} {}", fmt_f64(p.x), fmt_f64(p.y)));
            }
            PathCommand::LineTo(p) => {
                d.push_str(&format!("L{} {}", fmt_f64(p.x), fmt_f64(p.y)));
            }
            PathCommand::QuadTo(c, p) => {
                d.push_str(&format!(
                    "Q{} {} {} {}",
                    fmt_f64(c.x),
                    fmt_f64(c.y),
                    fmt_f64(p.x),
                    fmt_f64(p.y)
                ));
            }
            PathCommand::CubicTo(c1, c2, p) => {
                d.push_str(&format!(
                    "C{} {} {} {} {} {}",
                    fmt_f64(c1.x),
                    fmt_f64(c1.y),
                    fmt_f64(c2.x),
                    fmt_f64(c2.y),
                    fmt_f64(p.x),
                    fmt_f64(p.y)
                ));
            }
        }
    }
    d
}

fn matrix_attr(t: Affine) -> String {
    let [a, b, c, d, e, f] = t.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_f64(a),
        fmt_f64(b),
        fmt_f64(c),
        fmt_f64(d),
        fmt_f64(e),
        fmt_f64(f)
    )
}

fn opacity_attr(name: &str, value: f64) -> String {
    if value < 1.0 {
        format!(" {name}=\"{}\"", fmt_f64(value))
    } else {
        String::new()
    }
}

/// Locale-independent float formatting: integral values print without a
/// fraction, `-0` normalizes to `0`.
pub(crate) fn fmt_f64(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = if v == 0.0 { 0.0 } else { v };
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
