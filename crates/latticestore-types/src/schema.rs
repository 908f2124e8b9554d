//! Logical schema document shapes (as persisted/user-authored) and the
//! enriched, synthesized shapes the rest of the core operates against.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;
use crate::logical_type::LogicalType;

/// Per-clustering-column sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_cql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(StoreError::schema(format!("invalid sort direction '{other}'"))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cql())
    }
}

impl Serialize for SortOrder {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_cql())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accepts either a bare value or an array of values — the shape schema
/// documents use for `range`, `order`, `static`, and `proj`.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        One(T),
        Many(Vec<T>),
    }

    Ok(match Raw::<T>::deserialize(deserializer)? {
        Raw::One(v) => vec![v],
        Raw::Many(v) => v,
    })
}

/// The `index` / secondary-index-descriptor shape as written by the caller.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexDescriptor {
    pub hash: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub range: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub order: Vec<SortOrder>,
    #[serde(default, rename = "static", deserialize_with = "one_or_many")]
    pub static_columns: Vec<String>,
}

/// A secondary-index descriptor: an `IndexDescriptor` plus extra projected
/// attributes to copy onto the companion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecondaryIndexDescriptor {
    #[serde(flatten)]
    pub index: IndexDescriptor,
    #[serde(default, deserialize_with = "one_or_many")]
    pub proj: Vec<String>,
}

/// The schema document exactly as the caller supplies it to `createTable`
/// and as it is persisted (JSON-encoded) into the `meta` table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaDoc {
    pub attributes: BTreeMap<String, LogicalType>,
    pub index: IndexDescriptor,
    #[serde(default, rename = "secondaryIndexes")]
    pub secondary_indexes: BTreeMap<String, SecondaryIndexDescriptor>,
}

/// A fully-resolved physical table shape: either the primary table or one
/// synthesized companion.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub attributes: BTreeMap<String, LogicalType>,
    pub hash: String,
    pub range: Vec<String>,
    pub order: BTreeMap<String, SortOrder>,
    pub static_columns: BTreeSet<String>,
    pub index_attributes: BTreeSet<String>,
}

impl TableSchema {
    /// Clustering columns in declaration order, as they appear in
    /// `PRIMARY KEY (hash, range...)`.
    pub fn clustering_columns(&self) -> &[String] {
        &self.range
    }

    pub fn first_clustering_column(&self) -> Option<&str> {
        self.range.first().map(String::as_str)
    }
}

/// The schema document after validation and companion synthesis — what the
/// Schema Manager caches and planners consume.
#[derive(Debug, Clone)]
pub struct EnrichedSchema {
    pub primary: TableSchema,
    pub companions: BTreeMap<String, TableSchema>,
}

impl EnrichedSchema {
    pub fn target(&self, index: Option<&str>) -> Option<&TableSchema> {
        match index {
            Some(name) => self.companions.get(name),
            None => Some(&self.primary),
        }
    }

    pub fn family_name(index: Option<&str>) -> String {
        match index {
            Some(name) => format!("i_{name}"),
            None => "data".to_string(),
        }
    }
}
