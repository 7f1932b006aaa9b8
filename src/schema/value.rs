use std::collections::BTreeMap;

/// Dynamic decoded value: a closed union mirroring what the embedded schema
/// can express.
///
/// Missing record fields resolve to each type's zero default through the
/// accessors below, so downstream stages never need `Option` plumbing for
/// the common read path.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent field marker; every accessor returns its zero default.
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

static NULL: Value = Value::Null;
static EMPTY: [Value; 0] = [];

impl Value {
    /// Field lookup on a record; `Null` for anything else or a missing key.
    pub fn get(&self, key: &str) -> &Value {
        match self {
            Value::Record(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Nested lookup along a `.`-free key chain.
    pub fn get_path(&self, keys: &[&str]) -> &Value {
        let mut v = self;
        for key in keys {
            v = v.get(key);
        }
        v
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Uint(v) => *v != 0,
            Value::Int(v) => *v != 0,
            _ => false,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            Value::Int(v) => *v as f64,
            Value::Uint(v) => *v as f64,
            _ => 0.0,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            Value::Uint(v) => *v,
            Value::Int(v) if *v >= 0 => *v as u64,
            Value::Float(v) if *v >= 0.0 => *v as u64,
            _ => 0,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Int(v) => *v,
            Value::Uint(v) => *v as i64,
            Value::Float(v) => *v as i64,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            _ => "",
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Bytes(b) => b,
            _ => &[],
        }
    }

    pub fn as_array(&self) -> &[Value] {
        match self {
            Value::Array(items) => items,
            _ => &EMPTY,
        }
    }

    /// Record entries, empty for non-records.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        let map = match self {
            Value::Record(map) => Some(map),
            _ => None,
        };
        map.into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), v)))
    }
}
