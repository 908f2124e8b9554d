//! Compiles `delete` requests, including per-row statements for the
//! companion tables a deletion needs to stay in sync with the primary row.

use latticestore_query::{compile_predicate, qualified, quote_ident, Predicate, Statement};
use latticestore_types::{Row, StoreResult, TableSchema, Value};

/// `DELETE FROM ks.tbl [WHERE <predicate>]`, table defaulting to `data`.
pub fn compile(keyspace: &str, family: &str, predicate: Option<&Predicate>) -> StoreResult<Statement> {
    let table = qualified(keyspace, family);
    let mut query = format!("DELETE FROM {table}");
    let mut params = Vec::new();
    if let Some(predicate) = predicate {
        let compiled = compile_predicate(predicate)?;
        if !compiled.query.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&compiled.query);
            params = compiled.params;
        }
    }
    Ok(Statement { query, params })
}

/// A precise, key-equality delete for a single already-read row — used to
/// delete exactly the rows a loose predicate matched, one row at a time.
pub fn row_delete(keyspace: &str, family: &str, target: &TableSchema, row: &Row) -> Option<Statement> {
    let table = qualified(keyspace, family);
    let mut clauses = Vec::with_capacity(target.index_attributes.len());
    let mut params = Vec::with_capacity(target.index_attributes.len());
    for col in &target.index_attributes {
        let value = row.get(col)?;
        clauses.push(format!("{} = ?", quote_ident(col)));
        params.push(value.clone());
    }
    Some(Statement { query: format!("DELETE FROM {table} WHERE {}", clauses.join(" AND ")), params })
}
