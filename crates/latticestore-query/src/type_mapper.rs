//! Component C: maps closed logical types onto their physical CQL-style
//! column types.

use latticestore_types::{LogicalType, StoreResult};

/// A pure function from logical type to physical type. Exhaustive over
/// `LogicalType` so a new variant fails to compile here rather than
/// silently falling through.
pub fn physical_type(ty: &LogicalType) -> StoreResult<String> {
    Ok(match ty {
        LogicalType::String => "text".to_string(),
        LogicalType::Json => "text".to_string(),
        LogicalType::Blob => "blob".to_string(),
        LogicalType::Decimal => "decimal".to_string(),
        LogicalType::Double => "double".to_string(),
        LogicalType::Boolean => "boolean".to_string(),
        LogicalType::Varint => "varint".to_string(),
        LogicalType::TimeUuid => "timeuuid".to_string(),
        LogicalType::Uuid => "uuid".to_string(),
        LogicalType::Timestamp => "timestamp".to_string(),
        LogicalType::Set(inner) => format!("set<{}>", physical_type(inner)?),
    })
}
