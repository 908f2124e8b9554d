//! Persists, retrieves, validates, and caches schema
//! documents. The cache is the only mutable shared state in the core:
//! write-once per keyspace, evicted only by `dropTable`.

use std::collections::HashMap;
use std::sync::Arc;

use latticestore_query::{qualified, quote_ident};
use latticestore_types::{EnrichedSchema, SchemaDoc, StoreError, StoreResult, Value};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::driver::{BoundStatement, Driver, ExecuteOptions};
use crate::synthesis;

const META_FAMILY: &str = "meta";
const SCHEMA_KEY: &str = "schema";

/// Caches [`EnrichedSchema`]s per physical keyspace name.
#[derive(Default)]
pub struct SchemaManager {
    cache: RwLock<HashMap<String, Arc<EnrichedSchema>>>,
}

impl SchemaManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the enriched schema for `keyspace`, consulting the cache
    /// first. Errors with `NotFound` if no schema document has been
    /// persisted (callers — `get`/`put`/`delete` — require one to exist).
    #[instrument(skip(self, driver), fields(keyspace))]
    pub async fn load(
        &self,
        driver: &dyn Driver,
        keyspace: &str,
    ) -> StoreResult<Arc<EnrichedSchema>> {
        if let Some(cached) = self.cache.read().await.get(keyspace) {
            return Ok(Arc::clone(cached));
        }

        let doc = self
            .fetch_document(driver, keyspace)
            .await?
            .ok_or_else(|| StoreError::not_found(keyspace))?;
        let enriched = Arc::new(synthesis::enrich(&doc)?);

        // Last-writer-wins: a concurrent loader may have already inserted
        // an equivalent entry; overwriting it is semantically safe.
        self.cache.write().await.insert(keyspace.to_string(), Arc::clone(&enriched));
        Ok(enriched)
    }

    /// Validates `doc`, persists it into the `meta` table, and seeds the
    /// cache so the immediately-following first `get`/`put` does not pay
    /// for a redundant read-back.
    #[instrument(skip(self, driver, doc), fields(keyspace))]
    pub async fn create(
        &self,
        driver: &dyn Driver,
        keyspace: &str,
        doc: SchemaDoc,
    ) -> StoreResult<Arc<EnrichedSchema>> {
        let enriched = Arc::new(synthesis::enrich(&doc)?);
        let json = serde_json::to_string(&doc)
            .map_err(|e| StoreError::schema(format!("schema document not serializable: {e}")))?;

        let statement = BoundStatement {
            query: format!(
                "INSERT INTO {} ({}, {}) VALUES (?, ?)",
                qualified(keyspace, META_FAMILY),
                quote_ident("key"),
                quote_ident("value"),
            ),
            params: vec![Value::Text(SCHEMA_KEY.to_string()), Value::Text(json)],
        };
        driver
            .execute(statement, ExecuteOptions::default())
            .await
            .map_err(|e| StoreError::driver(e.0))?;

        self.cache.write().await.insert(keyspace.to_string(), Arc::clone(&enriched));
        Ok(enriched)
    }

    /// Evicts the cache entry for `keyspace`. Called by `dropTable` — the
    /// keyspace no longer exists, so the cached schema describes nothing
    /// and dropping it is not "schema mutation".
    pub async fn evict(&self, keyspace: &str) {
        self.cache.write().await.remove(keyspace);
    }

    async fn fetch_document(
        &self,
        driver: &dyn Driver,
        keyspace: &str,
    ) -> StoreResult<Option<SchemaDoc>> {
        let statement = BoundStatement {
            query: format!(
                "SELECT {} FROM {} WHERE {} = ?",
                quote_ident("value"),
                qualified(keyspace, META_FAMILY),
                quote_ident("key"),
            ),
            params: vec![Value::Text(SCHEMA_KEY.to_string())],
        };
        let rows = driver
            .execute(statement, ExecuteOptions::default())
            .await
            .map_err(|e| StoreError::driver(e.0))?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let Some(Value::Text(json)) = row.get("value") else {
            return Err(StoreError::schema("meta row for 'schema' has no text 'value' column"));
        };
        let doc: SchemaDoc = serde_json::from_str(json)
            .map_err(|e| StoreError::schema(format!("stored schema document is malformed: {e}")))?;
        Ok(Some(doc))
    }
}
