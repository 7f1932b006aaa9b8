use super::*;

fn blob(vertices: &[(f32, f32)], segments: &[(u32, (f32, f32), u32, (f32, f32))]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(vertices.len() as u32).to_le_bytes());
    out.extend_from_slice(&(segments.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // regions, not decoded
    for (x, y) in vertices {
        out.extend_from_slice(&0u32.to_le_bytes()); // style
        out.extend_from_slice(&x.to_le_bytes());
        out.extend_from_slice(&y.to_le_bytes());
    }
    for (start, (sdx, sdy), end, (edx, edy)) in segments {
        out.extend_from_slice(&0u32.to_le_bytes()); // style
        out.extend_from_slice(&start.to_le_bytes());
        out.extend_from_slice(&sdx.to_le_bytes());
        out.extend_from_slice(&sdy.to_le_bytes());
        out.extend_from_slice(&end.to_le_bytes());
        out.extend_from_slice(&edx.to_le_bytes());
        out.extend_from_slice(&edy.to_le_bytes());
    }
    out
}

#[test]
fn decodes_vertices_and_segments() {
    let bytes = blob(
        &[(0.0, 0.0), (10.0, 0.0)],
        &[(0, (0.0, 0.0), 1, (0.0, 0.0))],
    );
    let net = VectorNetwork::decode(&bytes).unwrap();
    assert_eq!(net.vertices.len(), 2);
    assert_eq!(net.segments.len(), 1);
    assert_eq!(net.segments[0].start, 0);
    assert_eq!(net.segments[0].end, 1);
}

#[test]
fn short_header_is_corrupt() {
    assert!(VectorNetwork::decode(&[0, 0]).is_err());
}

#[test]
fn undersized_table_is_corrupt() {
    let mut bytes = blob(&[(0.0, 0.0), (1.0, 1.0)], &[]);
    bytes[0] = 50; // claim 50 vertices
    assert!(VectorNetwork::decode(&bytes).is_err());
}

#[test]
fn out_of_range_segment_index_is_corrupt() {
    let bytes = blob(&[(0.0, 0.0)], &[(0, (0.0, 0.0), 7, (0.0, 0.0))]);
    assert!(VectorNetwork::decode(&bytes).is_err());
}

#[test]
fn straight_segments_chain_into_lines() {
    let bytes = blob(
        &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)],
        &[
            (0, (0.0, 0.0), 1, (0.0, 0.0)),
            (1, (0.0, 0.0), 2, (0.0, 0.0)),
        ],
    );
    let net = VectorNetwork::decode(&bytes).unwrap();
    assert_eq!(
        net.centerline(),
        vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(10.0, 0.0)),
            PathCommand::LineTo(Point::new(10.0, 10.0)),
        ]
    );
}

#[test]
fn nonzero_handles_emit_cubics() {
    let bytes = blob(&[(0.0, 0.0), (10.0, 0.0)], &[(0, (2.0, 3.0), 1, (-2.0, 3.0))]);
    let net = VectorNetwork::decode(&bytes).unwrap();
    assert_eq!(
        net.centerline(),
        vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::CubicTo(
                Point::new(2.0, 3.0),
                Point::new(8.0, 3.0),
                Point::new(10.0, 0.0)
            ),
        ]
    );
}

#[test]
fn returning_chain_is_closed() {
    let bytes = blob(
        &[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)],
        &[
            (0, (0.0, 0.0), 1, (0.0, 0.0)),
            (1, (0.0, 0.0), 2, (0.0, 0.0)),
            (2, (0.0, 0.0), 0, (0.0, 0.0)),
        ],
    );
    let net = VectorNetwork::decode(&bytes).unwrap();
    let cmds = net.centerline();
    assert_eq!(cmds.last(), Some(&PathCommand::Close));
}

#[test]
fn broken_chain_starts_a_new_subpath() {
    let bytes = blob(
        &[(0.0, 0.0), (5.0, 0.0), (20.0, 20.0), (25.0, 20.0)],
        &[
            (0, (0.0, 0.0), 1, (0.0, 0.0)),
            (2, (0.0, 0.0), 3, (0.0, 0.0)),
        ],
    );
    let net = VectorNetwork::decode(&bytes).unwrap();
    let moves = net
        .centerline()
        .iter()
        .filter(|c| matches!(c, PathCommand::MoveTo(_)))
        .count();
    assert_eq!(moves, 2);
}

#[test]
fn degenerate_segments_are_dropped() {
    let bytes = blob(
        &[(0.0, 0.0), (10.0, 0.0)],
        &[
            (1, (0.0, 0.0), 1, (0.0, 0.0)),
            (0, (0.0, 0.0), 1, (0.0, 0.0)),
        ],
    );
    let net = VectorNetwork::decode(&bytes).unwrap();
    assert_eq!(
        net.centerline(),
        vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(10.0, 0.0)),
        ]
    );
}

#[test]
fn plausibility_rejects_out_of_box_vertices() {
    let inside = VectorNetwork {
        vertices: vec![
            NetworkVertex { x: -1.0, y: 0.0 },
            NetworkVertex { x: 11.5, y: 5.0 },
        ],
        segments: vec![],
    };
    assert!(inside.is_plausible(Vec2::new(10.0, 10.0)));

    let outside = VectorNetwork {
        vertices: vec![NetworkVertex { x: 13.0, y: 0.0 }],
        segments: vec![],
    };
    assert!(!outside.is_plausible(Vec2::new(10.0, 10.0)));
}

#[test]
fn plausibility_rejects_oversized_networks() {
    let net = VectorNetwork {
        vertices: vec![NetworkVertex { x: 0.0, y: 0.0 }; NETWORK_CEILING + 1],
        segments: vec![],
    };
    assert!(!net.is_plausible(Vec2::new(100.0, 100.0)));
}

#[test]
fn inline_form_mirrors_binary_semantics() {
    use crate::schema::Value;
    use std::collections::BTreeMap;

    fn rec(pairs: Vec<(&str, Value)>) -> Value {
        Value::Record(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    let inline = rec(vec![
        (
            "vertices",
            Value::Array(vec![
                rec(vec![("x", Value::Float(0.0)), ("y", Value::Float(0.0))]),
                rec(vec![("x", Value::Float(10.0)), ("y", Value::Float(0.0))]),
            ]),
        ),
        (
            "segments",
            Value::Array(vec![rec(vec![
                ("startVertex", Value::Uint(0)),
                ("endVertex", Value::Uint(1)),
            ])]),
        ),
    ]);

    let net = VectorNetwork::from_value(&inline).unwrap();
    assert_eq!(net.vertices.len(), 2);
    assert_eq!(
        net.centerline(),
        vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(10.0, 0.0)),
        ]
    );
}
