//! Runtime configuration surface. No HTTP surface is in scope, so this
//! is a plain constructor-injected struct rather than a layered config-file
//! loader.

use crate::driver::Consistency;

/// Replication knobs for `CREATE KEYSPACE`. The field is named
/// `replication_factor`, not `durability_level` as an earlier draft had it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationOptions {
    pub storage_class: String,
    pub replication_factor: u32,
}

impl Default for ReplicationOptions {
    fn default() -> Self {
        Self { storage_class: "SimpleStrategy".to_string(), replication_factor: 3 }
    }
}

/// Store-wide defaults an embedding application can override at
/// construction time.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub replication: ReplicationOptions,
    pub default_consistency: Consistency,
}
