//! The public facade: ties the Schema Manager and the four planners to
//! a `Driver` implementation.

use std::sync::Arc;

use latticestore_query::name_encoder;
use latticestore_types::{EnrichedSchema, Row, StoreError, StoreResult, Value};
use tracing::instrument;

use crate::config::StoreConfig;
use crate::ddl_planner;
use crate::delete_planner;
use crate::driver::{BoundStatement, Consistency, Driver, ExecuteOptions};
use crate::read_planner;
use crate::request::{CreateTableRequest, DeleteRequest, ReadRequest, ReadResponse, WriteRequest, WriteResponse};
use crate::schema_manager::SchemaManager;
use crate::write_planner;

const APPLIED_COLUMN: &str = "[applied]";

fn to_bound(statement: latticestore_query::Statement) -> BoundStatement {
    BoundStatement { query: statement.query, params: statement.params }
}

/// The document-store facade. Generic over any `Arc<dyn Driver>` so the
/// wire protocol, connection pooling, and prepared-statement caching stay
/// entirely outside this crate.
pub struct Store {
    driver: Arc<dyn Driver>,
    schemas: SchemaManager,
    config: StoreConfig,
}

impl Store {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver, schemas: SchemaManager::new(), config: StoreConfig::default() }
    }

    pub fn with_config(driver: Arc<dyn Driver>, config: StoreConfig) -> Self {
        Self { driver, schemas: SchemaManager::new(), config }
    }

    fn keyspace(reverse_domain: &str, table: &str) -> String {
        name_encoder::keyspace_name(reverse_domain, table)
    }

    #[instrument(skip(self, req), fields(keyspace = tracing::field::Empty))]
    pub async fn create_table(
        &self,
        reverse_domain: &str,
        table: &str,
        req: CreateTableRequest,
    ) -> StoreResult<()> {
        let keyspace = Self::keyspace(reverse_domain, table);
        tracing::Span::current().record("keyspace", keyspace.as_str());

        let enriched = crate::synthesis::enrich(&req.schema)?;

        let replication = crate::config::ReplicationOptions {
            storage_class: req.storage_class.unwrap_or_else(|| self.config.replication.storage_class.clone()),
            replication_factor: req.replication_factor.unwrap_or(self.config.replication.replication_factor),
        };

        let create_ks = ddl_planner::create_keyspace(&keyspace, &replication);
        self.driver
            .execute(to_bound(create_ks), ExecuteOptions::default())
            .await
            .map_err(|e| StoreError::driver(e.0))?;

        let data_stmt = ddl_planner::create_table(&keyspace, "data", &enriched.primary)?;
        let meta_stmt = ddl_planner::create_meta_table(&keyspace);
        let (data_res, meta_res) = tokio::join!(
            self.driver.execute(to_bound(data_stmt), ExecuteOptions::default()),
            self.driver.execute(to_bound(meta_stmt), ExecuteOptions::default()),
        );
        data_res.map_err(|e| StoreError::driver(e.0))?;
        meta_res.map_err(|e| StoreError::driver(e.0))?;

        for (name, companion) in &enriched.companions {
            let stmt = ddl_planner::create_table(&keyspace, &format!("i_{name}"), companion)?;
            self.driver
                .execute(to_bound(stmt), ExecuteOptions::default())
                .await
                .map_err(|e| StoreError::driver(e.0))?;
        }

        self.schemas.create(self.driver.as_ref(), &keyspace, req.schema).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(keyspace = tracing::field::Empty))]
    pub async fn drop_table(&self, reverse_domain: &str, table: &str) -> StoreResult<()> {
        let keyspace = Self::keyspace(reverse_domain, table);
        let stmt = ddl_planner::drop_keyspace(&keyspace);
        self.driver
            .execute(to_bound(stmt), ExecuteOptions::default())
            .await
            .map_err(|e| StoreError::driver(e.0))?;
        self.schemas.evict(&keyspace).await;
        Ok(())
    }

    #[instrument(skip(self, req), fields(keyspace = tracing::field::Empty))]
    pub async fn get(&self, reverse_domain: &str, table: &str, req: ReadRequest) -> StoreResult<ReadResponse> {
        let keyspace = Self::keyspace(reverse_domain, table);
        let schema = self.schemas.load(self.driver.as_ref(), &keyspace).await?;
        let target = self.resolve_target(&schema, req.index.as_deref())?;

        let (statement, consistency) = read_planner::compile(&keyspace, &req, Some(target))?;
        let options = ExecuteOptions { consistency, prepared: true };
        let rows = self
            .driver
            .execute(to_bound(statement), options)
            .await
            .map_err(|e| StoreError::driver(e.0))?;
        let items = read_planner::strip_driver_columns(rows);
        Ok(ReadResponse { count: items.len(), items })
    }

    #[instrument(skip(self, req), fields(keyspace = tracing::field::Empty, conditional = tracing::field::Empty))]
    pub async fn put(&self, reverse_domain: &str, table: &str, req: WriteRequest) -> StoreResult<WriteResponse> {
        let keyspace = Self::keyspace(reverse_domain, table);
        let schema = self.schemas.load(self.driver.as_ref(), &keyspace).await?;
        let compiled = write_planner::compile(&keyspace, &schema, &req)?;
        tracing::Span::current().record("conditional", compiled.conditional);

        let options = ExecuteOptions { consistency: compiled.consistency, prepared: true };

        if compiled.conditional {
            // Dispatched alone (never batched) so the CAS outcome row can
            // be read back — real wide-column engines do not
            // report `[applied]` meaningfully inside a mixed batch.
            let rows = self
                .driver
                .execute(to_bound(compiled.primary), options.clone())
                .await
                .map_err(|e| StoreError::driver(e.0))?;
            if !applied(&rows) {
                return Ok(WriteResponse::conditional(false));
            }
            self.dispatch(compiled.companions.into_iter().map(|(_, s)| s).collect(), options).await?;
            return Ok(WriteResponse::conditional(true));
        }

        let mut statements = vec![compiled.primary];
        statements.extend(compiled.companions.into_iter().map(|(_, s)| s));
        self.dispatch(statements, options).await?;
        Ok(WriteResponse::unconditional())
    }

    #[instrument(skip(self, req), fields(keyspace = tracing::field::Empty))]
    pub async fn delete(&self, reverse_domain: &str, table: &str, req: DeleteRequest) -> StoreResult<()> {
        let keyspace = Self::keyspace(reverse_domain, table);
        let schema = self.schemas.load(self.driver.as_ref(), &keyspace).await?;
        let consistency = Consistency::from_request(req.consistency.as_deref());
        let options = ExecuteOptions { consistency, prepared: true };

        if schema.companions.is_empty() {
            let stmt = delete_planner::compile(&keyspace, "data", req.attributes.as_ref())?;
            self.driver
                .execute(to_bound(stmt), options)
                .await
                .map_err(|e| StoreError::driver(e.0))?;
            return Ok(());
        }

        // Companion-symmetric delete: re-read the matched rows, then
        // delete each one from the primary table and every companion whose
        // key the row satisfies.
        let read_req = ReadRequest { attributes: req.attributes.clone(), ..ReadRequest::default() };
        let (read_stmt, _) = read_planner::compile(&keyspace, &read_req, Some(&schema.primary))?;
        let rows = self
            .driver
            .execute(to_bound(read_stmt), options.clone())
            .await
            .map_err(|e| StoreError::driver(e.0))?;

        let mut statements = Vec::new();
        for row in &rows {
            if let Some(stmt) = delete_planner::row_delete(&keyspace, "data", &schema.primary, row) {
                statements.push(stmt);
            }
            for (name, companion) in &schema.companions {
                if let Some(stmt) = delete_planner::row_delete(&keyspace, &format!("i_{name}"), companion, row) {
                    statements.push(stmt);
                }
            }
        }
        self.dispatch(statements, options).await
    }

    fn resolve_target<'a>(
        &self,
        schema: &'a EnrichedSchema,
        index: Option<&str>,
    ) -> StoreResult<&'a latticestore_types::TableSchema> {
        schema
            .target(index)
            .ok_or_else(|| StoreError::schema(format!("unknown secondary index '{}'", index.unwrap_or(""))))
    }

    async fn dispatch(
        &self,
        mut statements: Vec<latticestore_query::Statement>,
        options: ExecuteOptions,
    ) -> StoreResult<()> {
        match statements.len() {
            0 => Ok(()),
            1 => {
                self.driver
                    .execute(to_bound(statements.remove(0)), options)
                    .await
                    .map_err(|e| StoreError::driver(e.0))?;
                Ok(())
            }
            _ => {
                let bound = statements.into_iter().map(to_bound).collect();
                self.driver.batch(bound, options).await.map_err(|e| StoreError::driver(e.0))
            }
        }
    }
}

fn applied(rows: &[Row]) -> bool {
    match rows.first().and_then(|row| row.get(APPLIED_COLUMN)) {
        Some(Value::Bool(b)) => *b,
        _ => true,
    }
}
