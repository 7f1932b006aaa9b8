use crate::foundation::error::{FigError, FigResult};
use crate::schema::cursor::Cursor;

/// Primitive type codes; negative values in the wire form select these,
/// non-negative values index into the definition list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Primitive {
    Bool,
    Byte,
    Int,
    Uint,
    Float,
    String,
    Int64,
    Uint64,
}

impl Primitive {
    pub(crate) fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            -1 => Self::Bool,
            -2 => Self::Byte,
            -3 => Self::Int,
            -4 => Self::Uint,
            -5 => Self::Float,
            -6 => Self::String,
            -7 => Self::Int64,
            -8 => Self::Uint64,
            _ => return None,
        })
    }
}

/// Field type: a primitive family or a reference to another definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldType {
    Primitive(Primitive),
    Def(usize),
}

#[derive(Clone, Debug)]
pub(crate) struct FieldDef {
    pub(crate) name: String,
    pub(crate) tag: u32,
    pub(crate) ty: FieldType,
    pub(crate) is_array: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DefKind {
    Enum,
    Struct,
    Message,
}

/// One named type definition from the embedded schema.
#[derive(Clone, Debug)]
pub(crate) struct SchemaDef {
    pub(crate) name: String,
    pub(crate) kind: DefKind,
    pub(crate) fields: Vec<FieldDef>,
}

impl SchemaDef {
    pub(crate) fn field_by_tag(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

/// Parse the decompressed binary schema chunk into its definition list.
///
/// Wire layout: varint definition count, then per definition a
/// length-prefixed name, a kind byte, a varint field count, and per field a
/// length-prefixed name, varint tag, signed varint type code, and a
/// one-byte array flag.
pub(crate) fn parse_schema(bytes: &[u8]) -> FigResult<Vec<SchemaDef>> {
    let mut cur = Cursor::new(bytes);
    let def_count = cur.read_varint()?;
    if def_count > bytes.len() as u64 {
        return Err(FigError::corrupt(0, "definition count exceeds input size"));
    }

    let mut defs = Vec::with_capacity(def_count as usize);
    for _ in 0..def_count {
        let name = cur.read_string()?;
        let kind_pos = cur.pos();
        let kind = match cur.read_u8()? {
            0 => DefKind::Enum,
            1 => DefKind::Struct,
            2 => DefKind::Message,
            other => {
                return Err(FigError::corrupt(
                    kind_pos,
                    format!("unknown definition kind {other}"),
                ));
            }
        };

        let field_count = cur.read_varint()?;
        if field_count > bytes.len() as u64 {
            return Err(FigError::corrupt(kind_pos, "field count exceeds input size"));
        }

        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let field_name = cur.read_string()?;
            let tag = cur.read_varint()? as u32;
            let code_pos = cur.pos();
            let code = cur.read_varint_signed()?;
            let ty = if code < 0 {
                FieldType::Primitive(Primitive::from_code(code).ok_or_else(|| {
                    FigError::corrupt(code_pos, format!("unknown primitive code {code}"))
                })?)
            } else {
                FieldType::Def(code as usize)
            };
            let is_array = cur.read_bool()?;
            fields.push(FieldDef {
                name: field_name,
                tag,
                ty,
                is_array,
            });
        }

        defs.push(SchemaDef { name, kind, fields });
    }

    // Definition references must stay in range; checking once here keeps the
    // payload decoder free of per-field validation.
    for def in &defs {
        for field in &def.fields {
            if let FieldType::Def(idx) = field.ty
                && idx >= defs.len()
            {
                return Err(FigError::schema_mismatch(format!(
                    "field \"{}.{}\" references definition {idx} of {}",
                    def.name,
                    field.name,
                    defs.len()
                )));
            }
        }
    }

    Ok(defs)
}
