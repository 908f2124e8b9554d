//! JSON-friendly request/response DTOs for the five public operations.
//! These are what an HTTP/RPC surface — out of scope here — would
//! deserialize into before handing the request to the [`crate::Store`].

use std::collections::BTreeMap;

use latticestore_types::{Row, SchemaDoc};
use latticestore_query::Predicate;
use serde::{Deserialize, Serialize};


/// A single string or an array of strings — the shape `proj`/`attributes`
/// name-lists use on the wire.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NameList {
    One(String),
    Many(Vec<String>),
}

impl NameList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            NameList::One(s) => vec![s],
            NameList::Many(v) => v,
        }
    }
}

/// Inputs to `get`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ReadRequest {
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub attributes: Option<Predicate>,
    #[serde(default)]
    pub proj: Option<NameList>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub limit: Option<serde_json::Value>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub consistency: Option<String>,
}

/// Response shape of `get`: driver-internal columns are stripped
/// before rows reach the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ReadResponse {
    pub count: usize,
    pub items: Vec<Row>,
}

/// Inputs to `put`. `attributes` is a flat attribute-name → value
/// map; the Write Planner splits it into key/non-key columns itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WriteRequest {
    pub attributes: BTreeMap<String, latticestore_types::Value>,
    #[serde(default)]
    pub r#if: Option<WriteCondition>,
    #[serde(default)]
    pub consistency: Option<String>,
}

/// Either the literal `"not exists"` or an arbitrary compare-and-set
/// predicate object.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum WriteCondition {
    NotExists(String),
    Predicate(Predicate),
}

impl WriteCondition {
    /// `"not exists"`, case-insensitive and whitespace-normalised.
    pub fn is_not_exists(&self) -> bool {
        matches!(self, WriteCondition::NotExists(s) if s.trim().eq_ignore_ascii_case("not exists"))
    }
}

/// Response shape of `put`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WriteResponse {
    pub status: u16,
    pub applied: bool,
}

impl WriteResponse {
    pub fn unconditional() -> Self {
        Self { status: 201, applied: true }
    }

    pub fn conditional(applied: bool) -> Self {
        if applied {
            Self { status: 201, applied: true }
        } else {
            Self { status: 200, applied: false }
        }
    }
}

/// Inputs to `delete`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DeleteRequest {
    #[serde(default)]
    pub attributes: Option<Predicate>,
    #[serde(default)]
    pub consistency: Option<String>,
}

/// Inputs to `createTable` — the schema document plus replication
/// overrides for the `CREATE KEYSPACE` step.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTableRequest {
    #[serde(flatten)]
    pub schema: SchemaDoc,
    #[serde(default, rename = "storageClass")]
    pub storage_class: Option<String>,
    #[serde(default, rename = "replicationFactor")]
    pub replication_factor: Option<u32>,
}
