//! Shared fixtures for the end-to-end tests: an in-memory archive writer,
//! a binary schema encoder mirroring the decoder's wire format, and the
//! standard test schema used across scenarios.
#![allow(dead_code)]

use std::io::Write as _;

// ---------------------------------------------------------------------------
// Wire primitives
// ---------------------------------------------------------------------------

pub fn varint(mut v: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

pub fn zigzag(v: i64) -> Vec<u8> {
    varint(((v << 1) ^ (v >> 63)) as u64)
}

pub fn wire_string(s: &str) -> Vec<u8> {
    let mut out = varint(s.len() as u64);
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

pub fn zstd_compress(data: &[u8]) -> Vec<u8> {
    zstd::stream::encode_all(data, 0).unwrap()
}

// ---------------------------------------------------------------------------
// Archive writer
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Stored,
    Deflate,
}

/// Write a container the way the design tool does: zeroed sizes in local
/// headers, truth only in the trailing central directory.
pub fn write_archive(entries: &[(&str, &[u8], Method)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut directory = Vec::new();

    for (name, data, method) in entries {
        let offset = out.len();
        let (code, payload) = match method {
            Method::Stored => (0u16, data.to_vec()),
            Method::Deflate => (8u16, deflate(data)),
        };

        out.extend_from_slice(&0x0403_4B50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&code.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]); // dos time/date
        out.extend_from_slice(&[0u8; 4]); // crc32, unread
        out.extend_from_slice(&0u32.to_le_bytes()); // sizes deferred to the
        out.extend_from_slice(&0u32.to_le_bytes()); // central directory
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&payload);

        directory.push((name.to_string(), code, payload.len(), data.len(), offset));
    }

    let central_offset = out.len();
    for (name, code, compressed, uncompressed, offset) in &directory {
        out.extend_from_slice(&0x0201_4B50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&code.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(*compressed as u32).to_le_bytes());
        out.extend_from_slice(&(*uncompressed as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&(*offset as u32).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
    }
    let central_len = out.len() - central_offset;

    out.extend_from_slice(&0x0605_4B50u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&(directory.len() as u16).to_le_bytes());
    out.extend_from_slice(&(directory.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central_len as u32).to_le_bytes());
    out.extend_from_slice(&(central_offset as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

// ---------------------------------------------------------------------------
// Schema encoder
// ---------------------------------------------------------------------------

pub const KIND_ENUM: u8 = 0;
pub const KIND_STRUCT: u8 = 1;
pub const KIND_MESSAGE: u8 = 2;

pub const TY_BOOL: i64 = -1;
pub const TY_BYTE: i64 = -2;
pub const TY_INT: i64 = -3;
pub const TY_UINT: i64 = -4;
pub const TY_FLOAT: i64 = -5;
pub const TY_STRING: i64 = -6;

pub struct FieldSpec {
    pub name: &'static str,
    pub tag: u64,
    pub ty: i64,
    pub array: bool,
}

pub struct DefSpec {
    pub name: &'static str,
    pub kind: u8,
    pub fields: Vec<FieldSpec>,
}

fn field(name: &'static str, tag: u64, ty: i64) -> FieldSpec {
    FieldSpec {
        name,
        tag,
        ty,
        array: false,
    }
}

fn array(name: &'static str, tag: u64, ty: i64) -> FieldSpec {
    FieldSpec {
        name,
        tag,
        ty,
        array: true,
    }
}

pub fn encode_schema(defs: &[DefSpec]) -> Vec<u8> {
    let mut out = varint(defs.len() as u64);
    for def in defs {
        out.extend(wire_string(def.name));
        out.push(def.kind);
        out.extend(varint(def.fields.len() as u64));
        for f in &def.fields {
            out.extend(wire_string(f.name));
            out.extend(varint(f.tag));
            out.extend(zigzag(f.ty));
            out.push(u8::from(f.array));
        }
    }
    out
}

/// Encode a `serde_json::Value` tree against a definition. Message fields
/// are emitted in declaration order; enum values are written by name; byte
/// arrays accept JSON arrays of numbers.
pub fn encode_value(defs: &[DefSpec], def_idx: usize, value: &serde_json::Value) -> Vec<u8> {
    let def = &defs[def_idx];
    let mut out = Vec::new();
    match def.kind {
        KIND_ENUM => {
            let name = value.as_str().expect("enum value must be a string");
            let f = def
                .fields
                .iter()
                .find(|f| f.name == name)
                .unwrap_or_else(|| panic!("enum {} has no value {name}", def.name));
            out.extend(varint(f.tag));
        }
        KIND_STRUCT => {
            for f in &def.fields {
                let field_value = value.get(f.name).unwrap_or(&serde_json::Value::Null);
                out.extend(encode_field(defs, f, field_value));
            }
        }
        KIND_MESSAGE => {
            for f in &def.fields {
                if let Some(field_value) = value.get(f.name) {
                    out.extend(varint(f.tag));
                    out.extend(encode_field(defs, f, field_value));
                }
            }
            out.extend(varint(0));
        }
        other => panic!("unknown definition kind {other}"),
    }
    out
}

fn encode_field(defs: &[DefSpec], f: &FieldSpec, value: &serde_json::Value) -> Vec<u8> {
    if f.array {
        if f.ty == TY_BYTE {
            let bytes: Vec<u8> = value
                .as_array()
                .expect("byte array must be a JSON array")
                .iter()
                .map(|v| v.as_u64().expect("byte") as u8)
                .collect();
            let mut out = varint(bytes.len() as u64);
            out.extend(bytes);
            return out;
        }
        let items = value.as_array().expect("array field must be a JSON array");
        let mut out = varint(items.len() as u64);
        for item in items {
            out.extend(encode_single(defs, f.ty, item));
        }
        return out;
    }
    encode_single(defs, f.ty, value)
}

fn encode_single(defs: &[DefSpec], ty: i64, value: &serde_json::Value) -> Vec<u8> {
    match ty {
        TY_BOOL => vec![u8::from(value.as_bool().unwrap_or(false))],
        TY_BYTE => vec![value.as_u64().unwrap_or(0) as u8],
        TY_INT => zigzag(value.as_i64().unwrap_or(0)),
        TY_UINT => varint(value.as_u64().unwrap_or(0)),
        TY_FLOAT => (value.as_f64().unwrap_or(0.0) as f32).to_le_bytes().to_vec(),
        TY_STRING => wire_string(value.as_str().unwrap_or("")),
        idx if idx >= 0 => encode_value(defs, idx as usize, value),
        other => panic!("unknown type code {other}"),
    }
}

// ---------------------------------------------------------------------------
// The standard test schema
// ---------------------------------------------------------------------------

pub const NODE_TYPE: usize = 0;
pub const GUID: usize = 1;
pub const PARENT_INDEX: usize = 2;
pub const COLOR: usize = 3;
pub const VECTOR: usize = 4;
pub const MATRIX: usize = 5;
pub const PAINT_TYPE: usize = 6;
pub const IMAGE: usize = 7;
pub const PAINT: usize = 8;
pub const TEXT_DATA: usize = 9;
pub const OVERRIDE_KEY: usize = 10;
pub const GUID_PATH: usize = 11;
pub const OVERRIDE_ENTRY: usize = 12;
pub const SYMBOL_DATA: usize = 13;
pub const BASELINE: usize = 14;
pub const DERIVED_TEXT_DATA: usize = 15;
pub const EFFECT_TYPE: usize = 16;
pub const EFFECT: usize = 17;
pub const WINDING: usize = 18;
pub const GEOMETRY: usize = 19;
pub const BLOB: usize = 20;
pub const NODE_CHANGE: usize = 21;
pub const MESSAGE: usize = 22;

pub fn test_schema() -> Vec<DefSpec> {
    vec![
        DefSpec {
            name: "NodeType",
            kind: KIND_ENUM,
            fields: vec![
                field("DOCUMENT", 1, 0),
                field("CANVAS", 2, 0),
                field("FRAME", 3, 0),
                field("RECTANGLE", 4, 0),
                field("TEXT", 5, 0),
                field("SYMBOL", 6, 0),
                field("INSTANCE", 7, 0),
                field("VECTOR", 8, 0),
                field("LINE", 9, 0),
            ],
        },
        DefSpec {
            name: "GUID",
            kind: KIND_STRUCT,
            fields: vec![field("sessionID", 1, TY_UINT), field("localID", 2, TY_UINT)],
        },
        DefSpec {
            name: "ParentIndex",
            kind: KIND_STRUCT,
            fields: vec![
                field("guid", 1, GUID as i64),
                field("position", 2, TY_STRING),
            ],
        },
        DefSpec {
            name: "Color",
            kind: KIND_STRUCT,
            fields: vec![
                field("r", 1, TY_FLOAT),
                field("g", 2, TY_FLOAT),
                field("b", 3, TY_FLOAT),
                field("a", 4, TY_FLOAT),
            ],
        },
        DefSpec {
            name: "Vector",
            kind: KIND_STRUCT,
            fields: vec![field("x", 1, TY_FLOAT), field("y", 2, TY_FLOAT)],
        },
        DefSpec {
            name: "Matrix",
            kind: KIND_STRUCT,
            fields: vec![
                field("m00", 1, TY_FLOAT),
                field("m01", 2, TY_FLOAT),
                field("m02", 3, TY_FLOAT),
                field("m10", 4, TY_FLOAT),
                field("m11", 5, TY_FLOAT),
                field("m12", 6, TY_FLOAT),
            ],
        },
        DefSpec {
            name: "PaintType",
            kind: KIND_ENUM,
            fields: vec![
                field("SOLID", 1, 0),
                field("IMAGE", 2, 0),
                field("GRADIENT_LINEAR", 3, 0),
            ],
        },
        DefSpec {
            name: "Image",
            kind: KIND_MESSAGE,
            fields: vec![array("hash", 1, TY_BYTE)],
        },
        DefSpec {
            name: "Paint",
            kind: KIND_MESSAGE,
            fields: vec![
                field("type", 1, PAINT_TYPE as i64),
                field("color", 2, COLOR as i64),
                field("opacity", 3, TY_FLOAT),
                field("visible", 4, TY_BOOL),
                field("image", 5, IMAGE as i64),
                field("imageScaleMode", 6, TY_STRING),
            ],
        },
        DefSpec {
            name: "TextData",
            kind: KIND_MESSAGE,
            fields: vec![field("characters", 1, TY_STRING)],
        },
        DefSpec {
            name: "OverrideKey",
            kind: KIND_MESSAGE,
            fields: vec![array("bytes", 1, TY_BYTE)],
        },
        DefSpec {
            name: "GuidPath",
            kind: KIND_MESSAGE,
            fields: vec![array("guids", 1, OVERRIDE_KEY as i64)],
        },
        DefSpec {
            name: "OverrideEntry",
            kind: KIND_MESSAGE,
            fields: vec![
                field("guidPath", 1, GUID_PATH as i64),
                field("textData", 2, TEXT_DATA as i64),
                array("fillPaints", 3, PAINT as i64),
                field("visible", 4, TY_BOOL),
                field("cornerRadius", 5, TY_FLOAT),
                field("size", 6, VECTOR as i64),
            ],
        },
        DefSpec {
            name: "SymbolData",
            kind: KIND_MESSAGE,
            fields: vec![
                field("symbolID", 1, GUID as i64),
                array("symbolOverrides", 2, OVERRIDE_ENTRY as i64),
            ],
        },
        DefSpec {
            name: "Baseline",
            kind: KIND_MESSAGE,
            fields: vec![
                field("firstCharacter", 1, TY_UINT),
                field("endCharacter", 2, TY_UINT),
                field("lineHeight", 3, TY_FLOAT),
            ],
        },
        DefSpec {
            name: "DerivedTextData",
            kind: KIND_MESSAGE,
            fields: vec![array("baselines", 1, BASELINE as i64)],
        },
        DefSpec {
            name: "EffectType",
            kind: KIND_ENUM,
            fields: vec![field("DROP_SHADOW", 1, 0), field("INNER_SHADOW", 2, 0)],
        },
        DefSpec {
            name: "Effect",
            kind: KIND_MESSAGE,
            fields: vec![
                field("type", 1, EFFECT_TYPE as i64),
                field("color", 2, COLOR as i64),
                field("offset", 3, VECTOR as i64),
                field("radius", 4, TY_FLOAT),
                field("spread", 5, TY_FLOAT),
                field("visible", 6, TY_BOOL),
            ],
        },
        DefSpec {
            name: "WindingRule",
            kind: KIND_ENUM,
            fields: vec![field("NONZERO", 1, 0), field("ODD", 2, 0)],
        },
        DefSpec {
            name: "Geometry",
            kind: KIND_MESSAGE,
            fields: vec![
                field("commandsBlob", 1, TY_UINT),
                field("commands", 2, TY_STRING),
                field("windingRule", 3, WINDING as i64),
            ],
        },
        DefSpec {
            name: "Blob",
            kind: KIND_MESSAGE,
            fields: vec![array("bytes", 1, TY_BYTE)],
        },
        DefSpec {
            name: "NodeChange",
            kind: KIND_MESSAGE,
            fields: vec![
                field("guid", 1, GUID as i64),
                field("type", 2, NODE_TYPE as i64),
                field("name", 3, TY_STRING),
                field("parentIndex", 4, PARENT_INDEX as i64),
                field("size", 5, VECTOR as i64),
                field("transform", 6, MATRIX as i64),
                array("fillPaints", 7, PAINT as i64),
                array("strokePaints", 8, PAINT as i64),
                field("strokeWeight", 9, TY_FLOAT),
                field("visible", 10, TY_BOOL),
                field("opacity", 11, TY_FLOAT),
                field("cornerRadius", 12, TY_FLOAT),
                field("textData", 13, TEXT_DATA as i64),
                field("fontSize", 14, TY_FLOAT),
                field("derivedTextData", 15, DERIVED_TEXT_DATA as i64),
                field("symbolData", 16, SYMBOL_DATA as i64),
                array("overrideKey", 17, TY_BYTE),
                field("mask", 18, TY_BOOL),
                array("effects", 19, EFFECT as i64),
                array("fillGeometry", 20, GEOMETRY as i64),
                array("strokeGeometry", 21, GEOMETRY as i64),
                field("vectorNetworkBlob", 22, TY_UINT),
                array("dashPattern", 23, TY_FLOAT),
            ],
        },
        DefSpec {
            name: "Message",
            kind: KIND_MESSAGE,
            fields: vec![
                array("nodeChanges", 1, NODE_CHANGE as i64),
                array("blobs", 2, BLOB as i64),
            ],
        },
    ]
}

// ---------------------------------------------------------------------------
// Canvas + archive assembly
// ---------------------------------------------------------------------------

pub const TEST_VERSION: u32 = 101;

/// Build `canvas.fig` bytes: magic, version, then length-prefixed
/// compressed schema and data chunks.
pub fn canvas_file(schema: &[u8], data: &[u8], use_zstd: bool) -> Vec<u8> {
    let (schema_c, data_c) = if use_zstd {
        (zstd_compress(schema), zstd_compress(data))
    } else {
        (deflate(schema), deflate(data))
    };
    let mut out = Vec::new();
    out.extend_from_slice(b"fig-kiwi");
    out.extend_from_slice(&TEST_VERSION.to_le_bytes());
    out.extend_from_slice(&(schema_c.len() as u32).to_le_bytes());
    out.extend_from_slice(&schema_c);
    out.extend_from_slice(&(data_c.len() as u32).to_le_bytes());
    out.extend_from_slice(&data_c);
    out
}

/// A complete single-document archive from a JSON message payload.
pub fn document_archive(message: &serde_json::Value, use_zstd: bool) -> Vec<u8> {
    let defs = test_schema();
    let schema = encode_schema(&defs);
    let data = encode_value(&defs, MESSAGE, message);
    let canvas = canvas_file(&schema, &data, use_zstd);
    write_archive(&[("canvas.fig", &canvas, Method::Deflate)])
}
