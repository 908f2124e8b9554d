//! Emits keyspace creation and `CREATE TABLE` statements for
//! the primary table and every secondary-index companion.

use latticestore_query::{quote_ident, type_mapper, Statement};
use latticestore_types::{StoreResult, TableSchema};

use crate::config::ReplicationOptions;

/// `CREATE KEYSPACE <ks> WITH REPLICATION = {...}`.
pub fn create_keyspace(keyspace: &str, replication: &ReplicationOptions) -> Statement {
    let query = format!(
        "CREATE KEYSPACE {} WITH REPLICATION = {{ 'class': '{}', 'replication_factor': {} }}",
        quote_ident(keyspace),
        replication.storage_class,
        replication.replication_factor,
    );
    Statement { query, params: Vec::new() }
}

/// `CREATE TABLE ks.family (...)`, including static columns, the primary
/// key clause, the compaction strategy, and — when any clustering order
/// was declared — a trailing `CLUSTERING ORDER BY` clause.
pub fn create_table(keyspace: &str, family: &str, schema: &TableSchema) -> StoreResult<Statement> {
    let mut columns = Vec::with_capacity(schema.attributes.len());
    for (name, ty) in &schema.attributes {
        let physical = type_mapper::physical_type(ty)?;
        let modifier = if schema.static_columns.contains(name) { " STATIC" } else { "" };
        columns.push(format!("{} {}{}", quote_ident(name), physical, modifier));
    }

    let mut pk = vec![quote_ident(&schema.hash)];
    pk.extend(schema.range.iter().map(|c| quote_ident(c)));

    let mut query = format!(
        "CREATE TABLE {}.{} ({}, PRIMARY KEY ({})) WITH compaction = {{ 'class' : 'LeveledCompactionStrategy' }}",
        quote_ident(keyspace),
        quote_ident(family),
        columns.join(", "),
        pk.join(", "),
    );

    if !schema.order.is_empty() {
        let clustering: Vec<String> = schema
            .range
            .iter()
            .filter_map(|c| schema.order.get(c).map(|dir| format!("{} {}", quote_ident(c), dir.as_cql())))
            .collect();
        if !clustering.is_empty() {
            query.push_str(&format!(" AND CLUSTERING ORDER BY ({})", clustering.join(", ")));
        }
    }

    Ok(Statement { query, params: Vec::new() })
}

/// `DROP KEYSPACE <ks>`, issued by `dropTable`.
pub fn drop_keyspace(keyspace: &str) -> Statement {
    Statement { query: format!("DROP KEYSPACE {}", quote_ident(keyspace)), params: Vec::new() }
}

/// The `meta` family's fixed two-column shape.
pub fn create_meta_table(keyspace: &str) -> Statement {
    let query = format!(
        "CREATE TABLE {}.{} ({} text, {} text, PRIMARY KEY ({}))",
        quote_ident(keyspace),
        quote_ident("meta"),
        quote_ident("key"),
        quote_ident("value"),
        quote_ident("key"),
    );
    Statement { query, params: Vec::new() }
}
