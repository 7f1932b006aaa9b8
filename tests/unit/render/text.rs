use super::*;
use crate::scene::{Baseline, NodeType, TextStyle};
use crate::schema::Value;
use std::collections::BTreeMap;

fn text_node(characters: &str, baselines: Vec<Baseline>) -> Node {
    let mut change = BTreeMap::new();
    change.insert(
        "guid".to_string(),
        Value::Record(BTreeMap::from([
            ("sessionID".to_string(), Value::Uint(1)),
            ("localID".to_string(), Value::Uint(1)),
        ])),
    );
    change.insert("type".to_string(), Value::String("TEXT".to_string()));
    let mut node = Node::from_change(&Value::Record(change)).unwrap();
    node.characters = characters.to_string();
    node.width = 100.0;
    node.height = 40.0;
    node.text = TextStyle {
        font_family: "Inter".to_string(),
        font_size: 12.0,
        line_height_px: 0.0,
        align_horizontal: TextAlignHorizontal::Left,
        auto_resize: String::new(),
        baselines,
    };
    assert_eq!(node.node_type, NodeType::Text);
    node
}

#[test]
fn baselines_drive_span_content_and_offsets() {
    let node = text_node(
        "Hello World",
        vec![
            Baseline {
                first_character: 0,
                end_character: 5,
                line_height: 16.0,
            },
            Baseline {
                first_character: 6,
                end_character: 11,
                line_height: 16.0,
            },
        ],
    );
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains(">Hello</tspan>"));
    assert!(out.contains(">World</tspan>"));
    let first = out.find("y=\"16\"").expect("first span at first baseline");
    let second = out.rfind("y=\"32\"").expect("second span 16 below the first");
    assert!(first < second);
}

#[test]
fn spans_trim_trailing_whitespace() {
    let node = text_node(
        "Hi   x",
        vec![Baseline {
            first_character: 0,
            end_character: 5,
            line_height: 10.0,
        }],
    );
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains(">Hi</tspan>"));
}

#[test]
fn newline_fallback_advances_by_line_height() {
    let mut node = text_node("a\nb", vec![]);
    node.text.line_height_px = 16.0;
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains(">a</tspan>"));
    assert!(out.contains(">b</tspan>"));
    assert!(out.contains("y=\"16\""));
    assert!(out.contains("y=\"32\""));
}

#[test]
fn newline_fallback_without_line_height_uses_the_font_size() {
    let node = text_node("a\nb", vec![]);
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    // 12px font, 1.2 factor between lines.
    let spans = out.matches("<tspan").count();
    assert_eq!(spans, 2);
}

#[test]
fn center_alignment_shifts_by_half_width() {
    let mut node = text_node("x", vec![]);
    node.text.align_horizontal = TextAlignHorizontal::Center;
    let out = emit_text(&node, Point::new(10.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains("text-anchor=\"middle\""));
    assert!(out.contains("x=\"60\""));
}

#[test]
fn right_alignment_shifts_by_width() {
    let mut node = text_node("x", vec![]);
    node.text.align_horizontal = TextAlignHorizontal::Right;
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains("text-anchor=\"end\""));
    assert!(out.contains("x=\"100\""));
}

#[test]
fn markup_characters_are_escaped() {
    let node = text_node("a<b&c", vec![]);
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains("a&lt;b&amp;c"));
}

#[test]
fn baseline_ranges_are_clamped_to_the_character_count() {
    let node = text_node(
        "ab",
        vec![Baseline {
            first_character: 0,
            end_character: 99,
            line_height: 10.0,
        }],
    );
    let out = emit_text(&node, Point::new(0.0, 0.0), "rgb(0,0,0)", 1.0);
    assert!(out.contains(">ab</tspan>"));
}
