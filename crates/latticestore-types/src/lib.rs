//! Shared types for the `latticestore` document-storage core: the closed
//! logical type enumeration, the runtime `Value` representation, the schema
//! document shapes, and the unified error type.

mod error;
mod logical_type;
mod schema;
mod value;

pub use error::{StoreError, StoreResult};
pub use logical_type::LogicalType;
pub use schema::{
    EnrichedSchema, IndexDescriptor, SchemaDoc, SecondaryIndexDescriptor, SortOrder, TableSchema,
};
pub use value::{Row, Value};
