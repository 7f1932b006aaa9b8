use kurbo::{Affine, Vec2};
use smallvec::SmallVec;

use crate::foundation::core::{Color, NodeId};
use crate::geometry::{PathCommand, parse_command_text};
use crate::schema::Value;

/// Closed set of node type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Vector,
    Line,
    Ellipse,
    Rectangle,
    RoundedRectangle,
    RegularPolygon,
    Star,
    BooleanOperation,
    Text,
    Slice,
    Section,
    Unknown,
}

impl NodeType {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "DOCUMENT" => Self::Document,
            "CANVAS" => Self::Canvas,
            "FRAME" => Self::Frame,
            "GROUP" => Self::Group,
            "SYMBOL" | "COMPONENT" => Self::Component,
            "COMPONENT_SET" => Self::ComponentSet,
            "INSTANCE" => Self::Instance,
            "VECTOR" => Self::Vector,
            "LINE" => Self::Line,
            "ELLIPSE" => Self::Ellipse,
            "RECTANGLE" => Self::Rectangle,
            "ROUNDED_RECTANGLE" => Self::RoundedRectangle,
            "REGULAR_POLYGON" => Self::RegularPolygon,
            "STAR" => Self::Star,
            "BOOLEAN_OPERATION" => Self::BooleanOperation,
            "TEXT" => Self::Text,
            "SLICE" => Self::Slice,
            "SECTION" => Self::Section,
            _ => Self::Unknown,
        }
    }

    /// Container types whose own box participates in clipping but whose
    /// geometry is just a rectangle.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Self::Frame
                | Self::Group
                | Self::Component
                | Self::ComponentSet
                | Self::Instance
                | Self::Section
        )
    }

    /// Shape types rendered from decoded geometry rather than their box.
    pub fn is_shape(self) -> bool {
        matches!(
            self,
            Self::Vector
                | Self::Line
                | Self::Ellipse
                | Self::RegularPolygon
                | Self::Star
                | Self::BooleanOperation
        )
    }
}

/// Compositing modes are parsed and kept, but only `Normal` renders; the
/// rest degrade to it with a warning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    PassThrough,
    #[default]
    Normal,
    Darken,
    Multiply,
    ColorBurn,
    Lighten,
    Screen,
    ColorDodge,
    Overlay,
    SoftLight,
    HardLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    fn parse(tag: &str) -> Self {
        match tag {
            "PASS_THROUGH" => Self::PassThrough,
            "DARKEN" => Self::Darken,
            "MULTIPLY" => Self::Multiply,
            "COLOR_BURN" => Self::ColorBurn,
            "LIGHTEN" => Self::Lighten,
            "SCREEN" => Self::Screen,
            "COLOR_DODGE" => Self::ColorDodge,
            "OVERLAY" => Self::Overlay,
            "SOFT_LIGHT" => Self::SoftLight,
            "HARD_LIGHT" => Self::HardLight,
            "DIFFERENCE" => Self::Difference,
            "EXCLUSION" => Self::Exclusion,
            "HUE" => Self::Hue,
            "SATURATION" => Self::Saturation,
            "COLOR" => Self::Color,
            "LUMINOSITY" => Self::Luminosity,
            _ => Self::Normal,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageScaleMode {
    #[default]
    Fill,
    Fit,
    Tile,
    Stretch,
}

/// Paint variants; gradient/video/emoji are recognized but unrenderable.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintKind {
    Solid,
    Image {
        /// 20-byte content hash into the archive's image map.
        hash: Vec<u8>,
        scale_mode: ImageScaleMode,
    },
    Unrenderable(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub kind: PaintKind,
    pub color: Color,
    pub opacity: f64,
    pub visible: bool,
}

impl Paint {
    fn from_value(v: &Value) -> Self {
        let tag = v.get("type").as_str();
        let kind = match tag {
            "SOLID" | "" => PaintKind::Solid,
            "IMAGE" => PaintKind::Image {
                hash: v.get_path(&["image", "hash"]).as_bytes().to_vec(),
                scale_mode: match v.get("imageScaleMode").as_str() {
                    "FIT" => ImageScaleMode::Fit,
                    "TILE" => ImageScaleMode::Tile,
                    "STRETCH" => ImageScaleMode::Stretch,
                    _ => ImageScaleMode::Fill,
                },
            },
            other => PaintKind::Unrenderable(other.to_string()),
        };
        Self {
            kind,
            color: color_from(v.get("color")),
            opacity: f64_or(v.get("opacity"), 1.0),
            visible: bool_or(v.get("visible"), true),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    ForegroundBlur,
    BackgroundBlur,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub color: Color,
    pub offset: Vec2,
    pub radius: f64,
    pub spread: f64,
    pub visible: bool,
}

impl Effect {
    fn from_value(v: &Value) -> Option<Self> {
        let kind = match v.get("type").as_str() {
            "DROP_SHADOW" => EffectKind::DropShadow,
            "INNER_SHADOW" => EffectKind::InnerShadow,
            "FOREGROUND_BLUR" => EffectKind::ForegroundBlur,
            "BACKGROUND_BLUR" => EffectKind::BackgroundBlur,
            _ => return None,
        };
        Some(Self {
            kind,
            color: color_from(v.get("color")),
            offset: Vec2::new(
                v.get_path(&["offset", "x"]).as_f64(),
                v.get_path(&["offset", "y"]).as_f64(),
            ),
            radius: v.get("radius").as_f64(),
            spread: v.get("spread").as_f64(),
            visible: bool_or(v.get("visible"), true),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeCap {
    #[default]
    None,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeAlign {
    #[default]
    Center,
    Inside,
    Outside,
}

/// Scalar or per-corner radius, clockwise from top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CornerRadius {
    Uniform(f64),
    PerCorner([f64; 4]),
}

impl Default for CornerRadius {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl CornerRadius {
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Uniform(r) => *r <= 0.0,
            Self::PerCorner(rs) => rs.iter().all(|r| *r <= 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Where a geometry reference finds its commands: a blob index into the
/// document blob array, or commands carried inline. Exactly one per path.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometrySource {
    Blob(usize),
    Inline(Vec<PathCommand>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeometryRef {
    pub source: GeometrySource,
    pub winding: WindingRule,
}

impl GeometryRef {
    fn from_value(v: &Value) -> Option<Self> {
        let winding = match v.get("windingRule").as_str() {
            "ODD" | "EVENODD" => WindingRule::EvenOdd,
            _ => WindingRule::NonZero,
        };
        let source = if !v.get("commandsBlob").is_null() {
            GeometrySource::Blob(v.get("commandsBlob").as_u64() as usize)
        } else if !v.get("commands").is_null() {
            GeometrySource::Inline(parse_command_text(v.get("commands").as_str()))
        } else {
            return None;
        };
        Some(Self { source, winding })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlignHorizontal {
    #[default]
    Left,
    Center,
    Right,
    Justified,
}

/// One laid-out line from the source tool's text engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline {
    pub first_character: usize,
    pub end_character: usize,
    pub line_height: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    /// Pixel line height; `0` means unset.
    pub line_height_px: f64,
    pub align_horizontal: TextAlignHorizontal,
    pub auto_resize: String,
    pub baselines: Vec<Baseline>,
}

/// Which node field a component property assignment lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropNodeField {
    TextData,
    Visible,
    OverriddenSymbolId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropRef {
    pub def_id: Vec<u8>,
    pub field: PropNodeField,
}

impl PropRef {
    fn from_value(v: &Value) -> Option<Self> {
        let field = match v.get("componentPropNodeField").as_str() {
            "TEXT_DATA" => PropNodeField::TextData,
            "VISIBLE" => PropNodeField::Visible,
            "OVERRIDDEN_SYMBOL_ID" => PropNodeField::OverriddenSymbolId,
            _ => return None,
        };
        Some(Self {
            def_id: v.get("defID").as_bytes().to_vec(),
            field,
        })
    }
}

/// A single scene node. One struct for every type; the renderer and
/// queries dispatch on [`NodeType`].
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    pub name: String,
    pub visible: bool,
    pub opacity: f64,
    pub blend_mode: BlendMode,

    /// Explicit local matrix; when `None` the local transform is a pure
    /// translation by `(x, y)`.
    pub transform: Option<Affine>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,

    pub fills: SmallVec<[Paint; 2]>,
    pub strokes: SmallVec<[Paint; 2]>,
    pub stroke_weight: f64,
    pub stroke_cap: StrokeCap,
    pub stroke_join: StrokeJoin,
    pub stroke_align: StrokeAlign,
    pub dash_pattern: Vec<f64>,
    pub corner_radius: CornerRadius,
    pub effects: SmallVec<[Effect; 2]>,

    pub characters: String,
    pub text: TextStyle,

    pub fill_geometry: Vec<GeometryRef>,
    pub stroke_geometry: Vec<GeometryRef>,
    /// Blob index of the binary vector network, if any.
    pub vector_network_blob: Option<usize>,
    /// Structured inline network; wins over the blob when both exist.
    pub inline_network: Option<Value>,

    pub is_mask: bool,
    pub clips_content: bool,

    /// Symbol linkage for INSTANCE nodes.
    pub symbol_id: Option<NodeId>,
    /// Raw override entries, resolved during expansion.
    pub symbol_overrides: Vec<Value>,
    pub component_prop_assignments: Vec<Value>,
    pub component_prop_refs: Vec<PropRef>,
    /// Key identifying this node inside a symbol subtree.
    pub override_key: Vec<u8>,

    /// Parent link as decoded; consumed by the tree builder.
    pub(crate) parent: Option<NodeId>,
    pub(crate) position: String,

    /// Arena indices of ordered children.
    pub(crate) children: Vec<usize>,
}

impl Node {
    /// Materialize a node from one decoded change record. Records without
    /// an id are unusable and yield `None`.
    pub(crate) fn from_change(v: &Value) -> Option<Self> {
        let guid = v.get("guid");
        if guid.is_null() {
            return None;
        }
        let id = node_id_from(guid)?;

        let parent_guid = v.get_path(&["parentIndex", "guid"]);
        let parent = node_id_from(parent_guid);
        let position = v.get_path(&["parentIndex", "position"]).as_str().to_string();

        let transform = affine_from(v.get("transform"));

        let symbol_id = node_id_from(v.get_path(&["symbolData", "symbolID"]));
        let symbol_overrides = v
            .get_path(&["symbolData", "symbolOverrides"])
            .as_array()
            .to_vec();

        let clips_content = if !v.get("frameMaskDisabled").is_null() {
            !v.get("frameMaskDisabled").as_bool()
        } else {
            v.get("clipsContent").as_bool()
        };

        Some(Self {
            id,
            node_type: NodeType::parse(v.get("type").as_str()),
            name: v.get("name").as_str().to_string(),
            visible: bool_or(v.get("visible"), true),
            opacity: f64_or(v.get("opacity"), 1.0),
            blend_mode: BlendMode::parse(v.get("blendMode").as_str()),
            transform,
            x: v.get("x").as_f64(),
            y: v.get("y").as_f64(),
            width: v.get_path(&["size", "x"]).as_f64(),
            height: v.get_path(&["size", "y"]).as_f64(),
            fills: v
                .get("fillPaints")
                .as_array()
                .iter()
                .map(Paint::from_value)
                .collect(),
            strokes: v
                .get("strokePaints")
                .as_array()
                .iter()
                .map(Paint::from_value)
                .collect(),
            stroke_weight: f64_or(v.get("strokeWeight"), 1.0),
            stroke_cap: match v.get("strokeCap").as_str() {
                "ROUND" => StrokeCap::Round,
                "SQUARE" => StrokeCap::Square,
                _ => StrokeCap::None,
            },
            stroke_join: match v.get("strokeJoin").as_str() {
                "BEVEL" => StrokeJoin::Bevel,
                "ROUND" => StrokeJoin::Round,
                _ => StrokeJoin::Miter,
            },
            stroke_align: match v.get("strokeAlign").as_str() {
                "INSIDE" => StrokeAlign::Inside,
                "OUTSIDE" => StrokeAlign::Outside,
                _ => StrokeAlign::Center,
            },
            dash_pattern: v
                .get("dashPattern")
                .as_array()
                .iter()
                .map(Value::as_f64)
                .collect(),
            corner_radius: corner_radius_from(v),
            effects: v
                .get("effects")
                .as_array()
                .iter()
                .filter_map(Effect::from_value)
                .collect(),
            characters: v.get_path(&["textData", "characters"]).as_str().to_string(),
            text: text_style_from(v),
            fill_geometry: v
                .get("fillGeometry")
                .as_array()
                .iter()
                .filter_map(GeometryRef::from_value)
                .collect(),
            stroke_geometry: v
                .get("strokeGeometry")
                .as_array()
                .iter()
                .filter_map(GeometryRef::from_value)
                .collect(),
            vector_network_blob: match v.get("vectorNetworkBlob") {
                Value::Null => None,
                blob => Some(blob.as_u64() as usize),
            },
            inline_network: match v.get("vectorNetwork") {
                Value::Null => None,
                net => Some(net.clone()),
            },
            is_mask: v.get("mask").as_bool(),
            clips_content,
            symbol_id,
            symbol_overrides,
            component_prop_assignments: v.get("componentPropAssignments").as_array().to_vec(),
            component_prop_refs: v
                .get("componentPropRefs")
                .as_array()
                .iter()
                .filter_map(PropRef::from_value)
                .collect(),
            override_key: v.get("overrideKey").as_bytes().to_vec(),
            parent,
            position,
            children: Vec::new(),
        })
    }

    /// Local transform: the explicit matrix, else translation by `(x, y)`.
    pub fn local_transform(&self) -> Affine {
        self.transform
            .unwrap_or_else(|| Affine::translate(Vec2::new(self.x, self.y)))
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// First visible solid fill, if any.
    pub fn solid_fill(&self) -> Option<&Paint> {
        self.fills
            .iter()
            .find(|p| p.visible && p.kind == PaintKind::Solid)
    }

    /// First visible stroke paint, if any.
    pub fn visible_stroke(&self) -> Option<&Paint> {
        self.strokes.iter().find(|p| p.visible)
    }

    pub(crate) fn children(&self) -> &[usize] {
        &self.children
    }
}

pub(crate) fn node_id_from(v: &Value) -> Option<NodeId> {
    if v.is_null() {
        return None;
    }
    Some(NodeId::new(
        v.get("sessionID").as_u64() as u32,
        v.get("localID").as_u64() as u32,
    ))
}

fn affine_from(v: &Value) -> Option<Affine> {
    if v.is_null() {
        return None;
    }
    // Row-major 2x3: x' = m00*x + m01*y + m02.
    Some(Affine::new([
        v.get("m00").as_f64(),
        v.get("m10").as_f64(),
        v.get("m01").as_f64(),
        v.get("m11").as_f64(),
        v.get("m02").as_f64(),
        v.get("m12").as_f64(),
    ]))
}

fn corner_radius_from(v: &Value) -> CornerRadius {
    let tl = v.get("rectangleTopLeftCornerRadius");
    let tr = v.get("rectangleTopRightCornerRadius");
    let br = v.get("rectangleBottomRightCornerRadius");
    let bl = v.get("rectangleBottomLeftCornerRadius");
    if !(tl.is_null() && tr.is_null() && br.is_null() && bl.is_null()) {
        let base = v.get("cornerRadius").as_f64();
        let pick = |c: &Value| if c.is_null() { base } else { c.as_f64() };
        let corners = [pick(tl), pick(tr), pick(br), pick(bl)];
        if corners.windows(2).any(|w| w[0] != w[1]) {
            return CornerRadius::PerCorner(corners);
        }
        return CornerRadius::Uniform(corners[0]);
    }
    CornerRadius::Uniform(v.get("cornerRadius").as_f64())
}

fn line_height_px_from(lh: &Value) -> f64 {
    match lh {
        Value::Null => 0.0,
        Value::Record(_) => {
            if lh.get("units").as_str() == "PIXELS" || lh.get("units").is_null() {
                lh.get("value").as_f64()
            } else {
                0.0
            }
        }
        other => other.as_f64(),
    }
}

fn baselines_from(derived: &Value) -> Vec<Baseline> {
    derived
        .get("baselines")
        .as_array()
        .iter()
        .map(|b| Baseline {
            first_character: b.get("firstCharacter").as_u64() as usize,
            end_character: b.get("endCharacter").as_u64() as usize,
            line_height: b.get("lineHeight").as_f64(),
        })
        .collect()
}

fn text_style_from(v: &Value) -> TextStyle {
    let line_height_px = line_height_px_from(v.get("lineHeight"));

    let derived = match v.get("derivedTextData") {
        Value::Null => v.get_path(&["textData", "derivedTextData"]),
        d => d,
    };
    let baselines = baselines_from(derived);

    TextStyle {
        font_family: v.get_path(&["fontName", "family"]).as_str().to_string(),
        font_size: v.get("fontSize").as_f64(),
        line_height_px,
        align_horizontal: match v.get("textAlignHorizontal").as_str() {
            "CENTER" => TextAlignHorizontal::Center,
            "RIGHT" => TextAlignHorizontal::Right,
            "JUSTIFIED" => TextAlignHorizontal::Justified,
            _ => TextAlignHorizontal::Left,
        },
        auto_resize: v.get("textAutoResize").as_str().to_string(),
        baselines,
    }
}

/// Merge one override entry's fields into a cloned symbol node. Only the
/// fields the entry actually carries are touched, so repeated applications
/// layer shallow-to-deep.
pub(crate) fn apply_override(node: &mut Node, entry: &Value) {
    let chars = entry.get_path(&["textData", "characters"]);
    if !chars.is_null() {
        node.characters = chars.as_str().to_string();
    }
    if !entry.get("fillPaints").is_null() {
        node.fills = entry
            .get("fillPaints")
            .as_array()
            .iter()
            .map(Paint::from_value)
            .collect();
    }
    if !entry.get("strokePaints").is_null() {
        node.strokes = entry
            .get("strokePaints")
            .as_array()
            .iter()
            .map(Paint::from_value)
            .collect();
    }
    let has_corner = !entry.get("cornerRadius").is_null()
        || !entry.get("rectangleTopLeftCornerRadius").is_null()
        || !entry.get("rectangleTopRightCornerRadius").is_null()
        || !entry.get("rectangleBottomRightCornerRadius").is_null()
        || !entry.get("rectangleBottomLeftCornerRadius").is_null();
    if has_corner {
        node.corner_radius = corner_radius_from(entry);
    }
    if !entry.get("size").is_null() {
        node.width = entry.get_path(&["size", "x"]).as_f64();
        node.height = entry.get_path(&["size", "y"]).as_f64();
    }
    if !entry.get("transform").is_null() {
        node.transform = affine_from(entry.get("transform"));
    }
    if !entry.get("fontName").is_null() {
        node.text.font_family = entry.get_path(&["fontName", "family"]).as_str().to_string();
    }
    if !entry.get("fontSize").is_null() {
        node.text.font_size = entry.get("fontSize").as_f64();
    }
    if !entry.get("lineHeight").is_null() {
        node.text.line_height_px = line_height_px_from(entry.get("lineHeight"));
    }
    if !entry.get("textAutoResize").is_null() {
        node.text.auto_resize = entry.get("textAutoResize").as_str().to_string();
    }
    if !entry.get("derivedTextData").is_null() {
        node.text.baselines = baselines_from(entry.get("derivedTextData"));
    }
    if !entry.get("fillGeometry").is_null() {
        node.fill_geometry = entry
            .get("fillGeometry")
            .as_array()
            .iter()
            .filter_map(GeometryRef::from_value)
            .collect();
    }
    if !entry.get("strokeGeometry").is_null() {
        node.stroke_geometry = entry
            .get("strokeGeometry")
            .as_array()
            .iter()
            .filter_map(GeometryRef::from_value)
            .collect();
    }
    if !entry.get("visible").is_null() {
        node.visible = entry.get("visible").as_bool();
    }
    if !entry.get("overriddenSymbolID").is_null() {
        node.symbol_id = node_id_from(entry.get("overriddenSymbolID")).or(node.symbol_id);
    }
}

fn color_from(v: &Value) -> Color {
    Color::new(
        v.get("r").as_f64(),
        v.get("g").as_f64(),
        v.get("b").as_f64(),
        v.get("a").as_f64(),
    )
}

fn bool_or(v: &Value, default: bool) -> bool {
    if v.is_null() { default } else { v.as_bool() }
}

fn f64_or(v: &Value, default: f64) -> f64 {
    if v.is_null() { default } else { v.as_f64() }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/node.rs"]
mod tests;
