//! The narrow contract this crate depends on for talking to the underlying
//! wide-column engine. A real deployment plugs in a ScyllaDB/Cassandra
//! driver; tests plug in the in-memory double under `tests/support.rs`.

use async_trait::async_trait;
use latticestore_types::{Row, Value};
use thiserror::Error;

/// Tunable read/write consistency, mirroring the underlying engine's
/// consistency levels. Anything accepted by a request but not one of these
/// three normalizes to [`Consistency::One`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consistency {
    #[default]
    One,
    LocalQuorum,
    All,
}

impl Consistency {
    /// Parses the request-facing spelling (`"all"`, `"localQuorum"`,
    /// case-insensitive); anything else — including absence — is `One`.
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("all") => Consistency::All,
            Some("localquorum") => Consistency::LocalQuorum,
            _ => Consistency::One,
        }
    }
}

/// A single statement plus the options it is dispatched under.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub consistency: Consistency,
    pub prepared: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self { consistency: Consistency::One, prepared: true }
    }
}

/// One statement of a batch, or a standalone `execute` call.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    pub query: String,
    pub params: Vec<Value>,
}

/// Error surfaced by a [`Driver`] implementation, converted verbatim into
/// `StoreError::Driver` at the store boundary.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

impl DriverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The database driver contract. Implementations own connection
/// pooling, prepared-statement caching, and wire protocol — none of that is
/// this crate's concern.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn execute(
        &self,
        statement: BoundStatement,
        options: ExecuteOptions,
    ) -> Result<Vec<Row>, DriverError>;

    async fn batch(
        &self,
        statements: Vec<BoundStatement>,
        options: ExecuteOptions,
    ) -> Result<(), DriverError>;
}
