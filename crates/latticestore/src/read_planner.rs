//! Compiles `get` requests into a single parameterised
//! read statement.

use latticestore_query::{compile_predicate, qualified, quote_ident, Statement};
use latticestore_types::{EnrichedSchema, StoreResult, TableSchema};

use crate::driver::Consistency;
use crate::request::ReadRequest;

const IMPLICIT_TID: &str = "_tid";

/// Compiles a `get` request against `target` (the primary table's schema,
/// or a companion's, as selected by `req.index`). `target` is `None` only
/// when the planner runs ahead of any schema having been cached — the
/// defensive branch calls out for `order` defaulting to `_tid`.
pub fn compile(
    keyspace: &str,
    req: &ReadRequest,
    target: Option<&TableSchema>,
) -> StoreResult<(Statement, Consistency)> {
    let family = EnrichedSchema::family_name(req.index.as_deref());
    let table = qualified(keyspace, &family);

    let projection = build_projection(req, target);
    let mut query = format!("SELECT {projection} FROM {table}");
    let mut params = Vec::new();

    if let Some(predicate) = &req.attributes {
        let compiled = compile_predicate(predicate)?;
        if !compiled.query.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&compiled.query);
            params = compiled.params;
        }
    }

    if let Some(direction) = parse_order(req.order.as_deref()) {
        // Ordering is valid only when the target has a clustering column.
        // The `_tid` default applies solely when no schema is cached yet —
        // a cached schema whose clustering list is empty drops the ORDER BY
        // rather than referencing a column that table doesn't have.
        match target {
            None => query.push_str(&format!(" ORDER BY {} {}", quote_ident(IMPLICIT_TID), direction)),
            Some(schema) => {
                if let Some(clustering) = schema.first_clustering_column() {
                    query.push_str(&format!(" ORDER BY {} {}", quote_ident(clustering), direction));
                }
            }
        }
    }

    if let Some(limit) = req.limit.as_ref().and_then(as_numeric_limit) {
        query.push_str(&format!(" LIMIT {limit}"));
    }

    let consistency = Consistency::from_request(req.consistency.as_deref());
    Ok((Statement { query, params }, consistency))
}

fn build_projection(req: &ReadRequest, target: Option<&TableSchema>) -> String {
    let distinct = if req.distinct { "distinct " } else { "" };

    let columns = match &req.proj {
        Some(proj) => proj.clone().into_vec(),
        None if req.order.is_some() => match target {
            // Workaround: ordering with a bare `*` projection is rejected
            // by the underlying engine, so expand it to the full column
            // list whenever an ORDER BY is going to be appended.
            Some(schema) => return format!(
                "{distinct}{}",
                schema
                    .attributes
                    .keys()
                    .map(|c| quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            None => return format!("{distinct}*"),
        },
        None => return format!("{distinct}*"),
    };

    format!("{distinct}{}", columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "))
}

fn parse_order(order: Option<&str>) -> Option<&'static str> {
    match order?.to_ascii_lowercase().as_str() {
        "asc" => Some("asc"),
        "desc" => Some("desc"),
        _ => None, // invalid directions are silently dropped
    }
}

fn as_numeric_limit(v: &serde_json::Value) -> Option<u64> {
    v.as_u64()
}

/// Strips any reserved `__driver_`-prefixed columns a driver implementation
/// may attach for its own bookkeeping.
pub fn strip_driver_columns(rows: Vec<latticestore_types::Row>) -> Vec<latticestore_types::Row> {
    rows.into_iter()
        .map(|mut row| {
            row.retain(|k, _| !k.starts_with("__driver_"));
            row
        })
        .collect()
}
