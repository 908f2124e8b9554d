//! `latticestore`: a document-oriented storage core layered over a
//! wide-column clustered database. This crate compiles a small set of
//! table-like operations (`createTable`, `get`, `put`, `delete`,
//! `dropTable`) into parameterised statements against a pluggable
//! [`Driver`], keeping secondary-index companion tables consistent with
//! their primary table on every write.

pub mod config;
pub mod driver;
pub mod request;
mod ddl_planner;
mod delete_planner;
mod read_planner;
mod schema_manager;
mod store;
mod synthesis;
mod time_uuid;
mod write_planner;

#[cfg(test)]
mod test_support;

pub use config::{ReplicationOptions, StoreConfig};
pub use driver::{BoundStatement, Consistency, Driver, DriverError, ExecuteOptions};
pub use request::{
    CreateTableRequest, DeleteRequest, NameList, ReadRequest, ReadResponse, WriteCondition,
    WriteRequest, WriteResponse,
};
pub use store::Store;

pub use latticestore_types::{
    EnrichedSchema, LogicalType, Row, SchemaDoc, StoreError, StoreResult, TableSchema, Value,
};
