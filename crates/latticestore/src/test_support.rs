//! A minimal in-memory `Driver` double for this crate's own unit tests
//! (the Schema Manager's meta-table persistence). Store-facade integration
//! tests use the fuller double under `tests/support/mod.rs` instead.

use std::sync::Mutex;

use async_trait::async_trait;
use latticestore_types::{Row, Value};

use crate::driver::{BoundStatement, Driver, DriverError, ExecuteOptions};

#[derive(Default)]
pub struct RecordingDriver {
    meta: Mutex<std::collections::HashMap<String, String>>,
    executed: Mutex<Vec<String>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed_queries(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn execute(
        &self,
        statement: BoundStatement,
        _options: ExecuteOptions,
    ) -> Result<Vec<Row>, DriverError> {
        self.executed.lock().unwrap().push(statement.query.clone());

        if statement.query.starts_with("INSERT INTO") {
            let Value::Text(value) = &statement.params[1] else {
                return Err(DriverError::new("expected text value"));
            };
            self.meta.lock().unwrap().insert("schema".to_string(), value.clone());
            return Ok(Vec::new());
        }

        if statement.query.starts_with("SELECT") {
            let stored = self.meta.lock().unwrap().get("schema").cloned();
            return Ok(match stored {
                Some(value) => {
                    let mut row = Row::new();
                    row.insert("value".to_string(), Value::Text(value));
                    vec![row]
                }
                None => Vec::new(),
            });
        }

        Err(DriverError::new(format!("unsupported statement in RecordingDriver: {}", statement.query)))
    }

    async fn batch(
        &self,
        statements: Vec<BoundStatement>,
        options: ExecuteOptions,
    ) -> Result<(), DriverError> {
        for statement in statements {
            self.execute(statement, options.clone()).await?;
        }
        Ok(())
    }
}
