use kurbo::Point;

use crate::render::svg::{escape_xml, fmt_f64};
use crate::scene::{Node, TextAlignHorizontal};

/// Default line advance multiplier when the node carries no explicit line
/// height.
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Emit a `<text>` element for a TEXT node at its transformed origin.
///
/// When the source tool's derived baselines are available, one span per
/// baseline reproduces its line breaking; otherwise the raw characters are
/// split on newlines and advanced by the node's line height.
pub(crate) fn emit_text(node: &Node, origin: Point, fill: &str, fill_opacity: f64) -> String {
    let (anchor, dx) = match node.text.align_horizontal {
        TextAlignHorizontal::Left | TextAlignHorizontal::Justified => ("start", 0.0),
        TextAlignHorizontal::Center => ("middle", node.width / 2.0),
        TextAlignHorizontal::Right => ("end", node.width),
    };
    let x = origin.x + dx;

    let mut out = format!("<text x=\"{}\" y=\"{}\"", fmt_f64(x), fmt_f64(origin.y));
    if !node.text.font_family.is_empty() {
        out.push_str(&format!(
            " font-family=\"{}\"",
            escape_xml(&node.text.font_family)
        ));
    }
    if node.text.font_size > 0.0 {
        out.push_str(&format!(" font-size=\"{}\"", fmt_f64(node.text.font_size)));
    }
    out.push_str(&format!(" fill=\"{fill}\""));
    if fill_opacity < 1.0 {
        out.push_str(&format!(" fill-opacity=\"{}\"", fmt_f64(fill_opacity)));
    }
    if anchor != "start" {
        out.push_str(&format!(" text-anchor=\"{anchor}\""));
    }
    out.push('>');

    for (text, offset_y) in layout_lines(node) {
        out.push_str(&format!(
            "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
            fmt_f64(x),
            fmt_f64(origin.y + offset_y),
            escape_xml(&text)
        ));
    }

    out.push_str("</text>");
    out
}

/// Lines with their vertical offsets from the text origin.
fn layout_lines(node: &Node) -> Vec<(String, f64)> {
    let chars: Vec<char> = node.characters.chars().collect();
    let mut lines = Vec::new();

    if !node.text.baselines.is_empty() {
        let mut offset = first_line_offset(node);
        for (i, baseline) in node.text.baselines.iter().enumerate() {
            let first = baseline.first_character.min(chars.len());
            let end = baseline.end_character.min(chars.len());
            let text: String = chars[first..end.max(first)].iter().collect();
            lines.push((text.trim_end().to_string(), offset));
            if i + 1 < node.text.baselines.len() {
                offset += baseline.line_height;
            }
        }
        return lines;
    }

    let advance = if node.text.line_height_px > 0.0 {
        node.text.line_height_px
    } else {
        node.text.font_size * LINE_HEIGHT_FACTOR
    };
    let mut offset = first_line_offset(node);
    for raw in node.characters.split('\n') {
        lines.push((raw.trim_end().to_string(), offset));
        offset += advance;
    }
    lines
}

/// The first baseline sits one line height below the node origin.
fn first_line_offset(node: &Node) -> f64 {
    if let Some(b) = node.text.baselines.first() {
        return b.line_height;
    }
    if node.text.line_height_px > 0.0 {
        return node.text.line_height_px;
    }
    node.text.font_size * LINE_HEIGHT_FACTOR
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
