use std::collections::BTreeMap;

use crate::foundation::error::{FigError, FigResult};
use crate::schema::cursor::Cursor;
use crate::schema::def::{DefKind, FieldType, Primitive, SchemaDef, parse_schema};
use crate::schema::value::Value;

/// Root message name priority, highest first.
const ROOT_NAMES: [&str; 4] = ["Message", "Document", "Fig", "Root"];

/// A parsed schema with its root message resolved, ready to decode payloads.
#[derive(Debug)]
pub(crate) struct CompiledSchema {
    defs: Vec<SchemaDef>,
    root: usize,
}

impl CompiledSchema {
    /// Parse and compile the decompressed schema chunk.
    pub(crate) fn compile(bytes: &[u8]) -> FigResult<Self> {
        let defs = parse_schema(bytes)?;
        let root = select_root(&defs)?;
        Ok(Self { defs, root })
    }

    pub(crate) fn root_name(&self) -> &str {
        &self.defs[self.root].name
    }

    /// Decode an entire payload against the root message.
    pub(crate) fn decode(&self, payload: &[u8]) -> FigResult<Value> {
        let mut cur = Cursor::new(payload);
        self.decode_def(self.root, &mut cur)
    }

    fn decode_def(&self, def_idx: usize, cur: &mut Cursor<'_>) -> FigResult<Value> {
        let def = &self.defs[def_idx];
        match def.kind {
            DefKind::Enum => self.decode_enum(def, cur),
            DefKind::Struct => self.decode_struct(def, cur),
            DefKind::Message => self.decode_message(def, cur),
        }
    }

    fn decode_enum(&self, def: &SchemaDef, cur: &mut Cursor<'_>) -> FigResult<Value> {
        let raw = cur.read_varint()? as u32;
        Ok(match def.field_by_tag(raw) {
            Some(field) => Value::String(field.name.clone()),
            // Unknown discriminants survive as their raw number so later
            // tool versions don't break older documents.
            None => Value::Uint(u64::from(raw)),
        })
    }

    /// Structs carry every field, in declaration order, with no tags.
    fn decode_struct(&self, def: &SchemaDef, cur: &mut Cursor<'_>) -> FigResult<Value> {
        let mut map = BTreeMap::new();
        for field in &def.fields {
            let value = self.decode_field(field.ty, field.is_array, cur)?;
            map.insert(field.name.clone(), value);
        }
        Ok(Value::Record(map))
    }

    /// Messages are tag-dispatched; tag 0 terminates.
    fn decode_message(&self, def: &SchemaDef, cur: &mut Cursor<'_>) -> FigResult<Value> {
        let mut map = BTreeMap::new();
        loop {
            let tag_pos = cur.pos();
            let tag = cur.read_varint()? as u32;
            if tag == 0 {
                return Ok(Value::Record(map));
            }
            let field = def.field_by_tag(tag).ok_or_else(|| {
                FigError::corrupt(
                    tag_pos,
                    format!("unknown tag {tag} in message \"{}\"", def.name),
                )
            })?;
            let value = self.decode_field(field.ty, field.is_array, cur)?;
            map.insert(field.name.clone(), value);
        }
    }

    fn decode_field(
        &self,
        ty: FieldType,
        is_array: bool,
        cur: &mut Cursor<'_>,
    ) -> FigResult<Value> {
        if !is_array {
            return self.decode_single(ty, cur);
        }

        // Byte arrays are a single length-prefixed run, not per-element.
        if ty == FieldType::Primitive(Primitive::Byte) {
            return Ok(Value::Bytes(cur.read_len_prefixed()?.to_vec()));
        }

        let count_pos = cur.pos();
        let count = cur.read_varint()?;
        if count > cur.remaining() as u64 {
            return Err(FigError::corrupt(
                count_pos,
                format!("array count {count} exceeds remaining bytes"),
            ));
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(self.decode_single(ty, cur)?);
        }
        Ok(Value::Array(items))
    }

    fn decode_single(&self, ty: FieldType, cur: &mut Cursor<'_>) -> FigResult<Value> {
        Ok(match ty {
            FieldType::Def(idx) => self.decode_def(idx, cur)?,
            FieldType::Primitive(p) => match p {
                Primitive::Bool => Value::Bool(cur.read_bool()?),
                Primitive::Byte => Value::Uint(u64::from(cur.read_u8()?)),
                Primitive::Int | Primitive::Int64 => Value::Int(cur.read_varint_signed()?),
                Primitive::Uint | Primitive::Uint64 => Value::Uint(cur.read_varint()?),
                Primitive::Float => Value::Float(f64::from(cur.read_f32_le()?)),
                Primitive::String => Value::String(cur.read_string()?),
            },
        })
    }
}

fn select_root(defs: &[SchemaDef]) -> FigResult<usize> {
    for name in ROOT_NAMES {
        if let Some(idx) = defs
            .iter()
            .position(|d| d.kind == DefKind::Message && d.name == name)
        {
            return Ok(idx);
        }
    }
    defs.iter()
        .position(|d| d.kind == DefKind::Message)
        .ok_or_else(|| FigError::schema_mismatch("schema has no message definition"))
}

#[cfg(test)]
#[path = "../../tests/unit/schema/decode.rs"]
mod tests;
