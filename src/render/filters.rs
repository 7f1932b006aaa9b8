use crate::render::svg::fmt_f64;
use crate::scene::{Effect, EffectKind};

/// Build one `<filter>` definition covering a node's effect list.
///
/// Only the first drop shadow, first inner shadow, and first layer blur
/// render; everything else is reported through `warnings`. Returns `None`
/// when nothing in the list is renderable.
pub(crate) fn compose_filter(
    id: &str,
    effects: &[Effect],
    warnings: &mut Vec<String>,
) -> Option<String> {
    let mut drop = None;
    let mut inner = None;
    let mut blur = None;

    for effect in effects.iter().filter(|e| e.visible) {
        match effect.kind {
            EffectKind::DropShadow => {
                if drop.is_none() {
                    drop = Some(effect);
                } else {
                    warnings.push("additional drop shadow ignored".to_string());
                }
            }
            EffectKind::InnerShadow => {
                if inner.is_none() {
                    inner = Some(effect);
                } else {
                    warnings.push("additional inner shadow ignored".to_string());
                }
            }
            EffectKind::ForegroundBlur => {
                if blur.is_none() {
                    blur = Some(effect);
                } else {
                    warnings.push("additional layer blur ignored".to_string());
                }
            }
            EffectKind::BackgroundBlur => {
                warnings.push("background blur is not renderable".to_string());
            }
        }
    }

    if drop.is_none() && inner.is_none() && blur.is_none() {
        return None;
    }

    let mut body = String::new();

    // Single drop shadow with zero spread collapses to the built-in
    // primitive.
    if let (Some(d), None, None) = (drop, inner, blur)
        && d.spread == 0.0
    {
        body.push_str(&format!(
            "<feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/>",
            fmt_f64(d.offset.x),
            fmt_f64(d.offset.y),
            fmt_f64(d.radius / 2.0),
            d.color.to_rgb_string(),
            fmt_f64(d.color.a),
        ));
        return Some(wrap_filter(id, &body));
    }

    if let Some(d) = drop {
        body.push_str(&format!(
            "<feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"{}\" result=\"dropBlur\"/>",
            fmt_f64(d.radius / 2.0)
        ));
        let mut shadow_in = "dropBlur";
        if d.spread != 0.0 {
            let op = if d.spread > 0.0 { "dilate" } else { "erode" };
            body.push_str(&format!(
                "<feMorphology in=\"dropBlur\" operator=\"{op}\" radius=\"{}\" result=\"dropSpread\"/>",
                fmt_f64(d.spread.abs())
            ));
            shadow_in = "dropSpread";
        }
        body.push_str(&format!(
            "<feOffset in=\"{shadow_in}\" dx=\"{}\" dy=\"{}\" result=\"dropOffset\"/>",
            fmt_f64(d.offset.x),
            fmt_f64(d.offset.y)
        ));
        body.push_str(&format!(
            "<feFlood flood-color=\"{}\" flood-opacity=\"{}\" result=\"dropColor\"/>",
            d.color.to_rgb_string(),
            fmt_f64(d.color.a)
        ));
        body.push_str(
            "<feComposite in=\"dropColor\" in2=\"dropOffset\" operator=\"in\" result=\"dropShadow\"/>",
        );
    }

    if let Some(i) = inner {
        body.push_str(
            "<feComponentTransfer in=\"SourceAlpha\" result=\"innerInverse\"><feFuncA type=\"table\" tableValues=\"1 0\"/></feComponentTransfer>",
        );
        body.push_str(&format!(
            "<feGaussianBlur in=\"innerInverse\" stdDeviation=\"{}\" result=\"innerBlur\"/>",
            fmt_f64(i.radius / 2.0)
        ));
        body.push_str(&format!(
            "<feOffset in=\"innerBlur\" dx=\"{}\" dy=\"{}\" result=\"innerOffset\"/>",
            fmt_f64(i.offset.x),
            fmt_f64(i.offset.y)
        ));
        body.push_str(&format!(
            "<feFlood flood-color=\"{}\" flood-opacity=\"{}\" result=\"innerColor\"/>",
            i.color.to_rgb_string(),
            fmt_f64(i.color.a)
        ));
        body.push_str(
            "<feComposite in=\"innerColor\" in2=\"innerOffset\" operator=\"in\" result=\"innerMasked\"/>",
        );
        body.push_str(
            "<feComposite in=\"innerMasked\" in2=\"SourceAlpha\" operator=\"in\" result=\"innerShadow\"/>",
        );
    }

    // Drop shadow sits beneath the source, inner shadow above it.
    body.push_str("<feMerge result=\"merged\">");
    if drop.is_some() {
        body.push_str("<feMergeNode in=\"dropShadow\"/>");
    }
    body.push_str("<feMergeNode in=\"SourceGraphic\"/>");
    if inner.is_some() {
        body.push_str("<feMergeNode in=\"innerShadow\"/>");
    }
    body.push_str("</feMerge>");

    if let Some(b) = blur {
        body.push_str(&format!(
            "<feGaussianBlur in=\"merged\" stdDeviation=\"{}\"/>",
            fmt_f64(b.radius / 2.0)
        ));
    }

    Some(wrap_filter(id, &body))
}

fn wrap_filter(id: &str, body: &str) -> String {
    format!(
        "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">{body}</filter>"
    )
}
