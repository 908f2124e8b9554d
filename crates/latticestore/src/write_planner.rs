//! Compiles `put` requests into an insert-or-update statement
//! against the primary table, plus one fan-out statement per secondary
//! index.

use std::collections::BTreeMap;

use latticestore_query::{compile_predicate, qualified, quote_ident, Statement};
use latticestore_types::{EnrichedSchema, StoreError, StoreResult, TableSchema, Value};

use crate::driver::Consistency;
use crate::request::{WriteCondition, WriteRequest};
use crate::time_uuid;

const IMPLICIT_TID: &str = "_tid";

/// The fully-compiled write: a primary statement (optionally conditional)
/// plus one unconditional statement per secondary-index companion.
pub struct CompiledWrite {
    pub primary: Statement,
    pub conditional: bool,
    pub companions: Vec<(String, Statement)>,
    pub consistency: Consistency,
}

pub fn compile(
    keyspace: &str,
    schema: &EnrichedSchema,
    req: &WriteRequest,
) -> StoreResult<CompiledWrite> {
    let resolved = resolve_keys(&schema.primary, &req.attributes)?;

    let non_key: BTreeMap<String, Value> = req
        .attributes
        .iter()
        .filter(|(k, _)| !schema.primary.index_attributes.contains(*k))
        .map(|(k, v)| (k.clone(), encode_if_object(v)))
        .collect();

    let not_exists = req.r#if.as_ref().is_some_and(WriteCondition::is_not_exists);
    let cas_predicate = match &req.r#if {
        Some(WriteCondition::Predicate(p)) => Some(p.clone()),
        _ => None,
    };

    let data_table = qualified(keyspace, "data");
    let (primary, conditional) = if non_key.is_empty() || not_exists {
        (insert_statement(&data_table, &resolved, &non_key, not_exists)?, not_exists)
    } else {
        let stmt = update_statement(&data_table, &schema.primary, &resolved, &non_key, cas_predicate.as_ref())?;
        (stmt, cas_predicate.is_some())
    };

    let mut companions = Vec::with_capacity(schema.companions.len());
    for (name, companion) in &schema.companions {
        let keys = resolve_keys(companion, &req.attributes)?;
        let projected = projected_attributes(companion, &req.attributes);
        let table = qualified(keyspace, &format!("i_{name}"));
        companions.push((name.clone(), insert_statement(&table, &keys, &projected, false)?));
    }

    let consistency = Consistency::from_request(req.consistency.as_deref());
    Ok(CompiledWrite { primary, conditional, companions, consistency })
}

/// Resolves every key column the target schema requires from the supplied
/// attributes, synthesizing `_tid` when it is a key and was not supplied.
fn resolve_keys(
    target: &TableSchema,
    attributes: &BTreeMap<String, Value>,
) -> StoreResult<BTreeMap<String, Value>> {
    let mut resolved = BTreeMap::new();
    for key in &target.index_attributes {
        if let Some(value) = attributes.get(key) {
            resolved.insert(key.clone(), value.clone());
        } else if key == IMPLICIT_TID {
            resolved.insert(key.clone(), Value::TimeUuid(time_uuid::now()));
        } else {
            return Err(StoreError::schema(format!("Index attribute {key} missing")));
        }
    }
    Ok(resolved)
}

fn encode_if_object(value: &Value) -> Value {
    if value.is_object_shaped() {
        if let Value::Json(inner) = value {
            return Value::Text(inner.to_string());
        }
    }
    value.clone()
}

/// Non-key companion attributes (the `proj` columns synthesis copied onto
/// the companion) that the caller actually supplied on this write.
fn projected_attributes(
    companion: &TableSchema,
    attributes: &BTreeMap<String, Value>,
) -> BTreeMap<String, Value> {
    companion
        .attributes
        .keys()
        .filter(|col| !companion.index_attributes.contains(*col))
        .filter_map(|col| attributes.get(col).map(|v| (col.clone(), encode_if_object(v))))
        .collect()
}

fn insert_statement(
    table: &str,
    keys: &BTreeMap<String, Value>,
    non_key: &BTreeMap<String, Value>,
    not_exists: bool,
) -> StoreResult<Statement> {
    let mut columns = Vec::with_capacity(keys.len() + non_key.len());
    let mut params = Vec::with_capacity(keys.len() + non_key.len());

    for (col, value) in keys {
        columns.push(quote_ident(col));
        params.push(value.clone());
    }
    for (col, value) in non_key {
        columns.push(quote_ident(col));
        params.push(value.clone());
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut query =
        format!("INSERT INTO {table} ({}) VALUES ({placeholders})", columns.join(", "));
    if not_exists {
        query.push_str(" IF NOT EXISTS");
    }
    Ok(Statement { query, params })
}

fn update_statement(
    table: &str,
    target: &TableSchema,
    keys: &BTreeMap<String, Value>,
    non_key: &BTreeMap<String, Value>,
    cas_predicate: Option<&latticestore_query::Predicate>,
) -> StoreResult<Statement> {
    let mut params = Vec::with_capacity(non_key.len() + keys.len());

    let set_clause = non_key
        .iter()
        .map(|(col, value)| {
            params.push(value.clone());
            format!("{} = ?", quote_ident(col))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let where_clause = target
        .index_attributes
        .iter()
        .map(|col| {
            params.push(keys[col].clone());
            format!("{} = ?", quote_ident(col))
        })
        .collect::<Vec<_>>()
        .join(" AND ");

    let mut query = format!("UPDATE {table} SET {set_clause} WHERE {where_clause}");

    if let Some(predicate) = cas_predicate {
        let compiled = compile_predicate(predicate)?;
        query.push_str(" IF ");
        query.push_str(&compiled.query);
        params.extend(compiled.params);
    }

    Ok(Statement { query, params })
}
