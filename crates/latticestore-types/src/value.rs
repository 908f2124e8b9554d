//! Runtime value representation bound to statement placeholders and
//! returned from driver reads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single bound or returned value. JSON-friendly shape so request objects
/// built from deserialized JSON map onto it directly once the caller has
/// consulted the schema to pick the right variant for ambiguous literals
/// (e.g. a bare string that should become a `Uuid` rather than a `Text`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Varint(i64),
    Double(f64),
    Decimal(String),
    Text(String),
    #[serde(with = "base64_bytes")]
    Blob(Vec<u8>),
    TimeUuid(Uuid),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    // `Set` must precede `Json`: `serde_json::Value` deserializes from any
    // JSON input, including arrays, so if it came first `Set` would be
    // unreachable from the wire and every array literal would land here.
    Set(Vec<Value>),
    Json(serde_json::Value),
}

/// A returned row, keyed by column name. `BTreeMap` gives deterministic
/// iteration order, which matters for tests that assert on row shape.
pub type Row = BTreeMap<String, Value>;

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

impl Value {
    /// True when the value is a JSON object/array — the Write Planner
    /// JSON-encodes these before binding to a non-key `json`-typed column.
    pub fn is_object_shaped(&self) -> bool {
        matches!(self, Value::Json(v) if v.is_object() || v.is_array())
    }
}
