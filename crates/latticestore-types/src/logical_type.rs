//! Closed enumeration of logical attribute types.
//!
//! Logical types are what a schema document declares; physical types (what
//! gets emitted into `CREATE TABLE`) are derived from them by the Type Mapper
//! in `latticestore-query`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    Blob,
    Decimal,
    Double,
    Boolean,
    Varint,
    String,
    TimeUuid,
    Uuid,
    Timestamp,
    Json,
    Set(Box<LogicalType>),
}

impl LogicalType {
    pub fn is_time_uuid(&self) -> bool {
        matches!(self, LogicalType::TimeUuid)
    }

    fn scalar_name(&self) -> Option<&'static str> {
        Some(match self {
            LogicalType::Blob => "blob",
            LogicalType::Decimal => "decimal",
            LogicalType::Double => "double",
            LogicalType::Boolean => "boolean",
            LogicalType::Varint => "varint",
            LogicalType::String => "string",
            LogicalType::TimeUuid => "timeuuid",
            LogicalType::Uuid => "uuid",
            LogicalType::Timestamp => "timestamp",
            LogicalType::Json => "json",
            LogicalType::Set(_) => return None,
        })
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Set(inner) => write!(f, "set<{}>", inner),
            other => write!(f, "{}", other.scalar_name().expect("scalar")),
        }
    }
}

impl FromStr for LogicalType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(inner) = s.strip_prefix("set<").and_then(|rest| rest.strip_suffix('>')) {
            return Ok(LogicalType::Set(Box::new(inner.parse()?)));
        }
        Ok(match s {
            "blob" => LogicalType::Blob,
            "decimal" => LogicalType::Decimal,
            "double" => LogicalType::Double,
            "boolean" => LogicalType::Boolean,
            "varint" => LogicalType::Varint,
            "string" => LogicalType::String,
            "timeuuid" => LogicalType::TimeUuid,
            "uuid" => LogicalType::Uuid,
            "timestamp" => LogicalType::Timestamp,
            "json" => LogicalType::Json,
            other => {
                return Err(StoreError::schema(format!("unknown logical type '{other}'")))
            }
        })
    }
}

impl Serialize for LogicalType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogicalType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
