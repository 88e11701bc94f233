// expectra-core/src/ports/connector.rs

// What the validation layer needs from an execution engine, without knowing which one.
// Adapters live in infrastructure/adapters (DuckDB, DataFusion).

use crate::domain::batch::BatchData;
use crate::domain::expectation::ColumnPairRow;
use crate::error::ExpectraError;
use async_trait::async_trait;
use std::path::Path;

// Engine-independent column description
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

#[async_trait]
pub trait Connector: Send + Sync {
    /// Runs a statement, discarding any rows.
    async fn execute(&self, query: &str) -> Result<(), ExpectraError>;

    /// Whether `table_name`, written as a quoted identifier, resolves to a registered table.
    async fn table_exists(&self, table_name: &str) -> Result<bool, ExpectraError>;

    /// Columns of a registered table. Errors if the table does not exist.
    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ExpectraError>;

    /// Registers a CSV file as table `name`, replacing any previous table of that name.
    async fn register_source(&self, name: &str, path: &Path) -> Result<(), ExpectraError>;

    /// Registers an in-memory batch, replacing any previous table of that name.
    async fn register_batch(&self, batch: &BatchData) -> Result<(), ExpectraError>;

    /// Runs a two-column `(value, count)` query and returns its rows in order.
    async fn query_column_pair(&self, query: &str) -> Result<Vec<ColumnPairRow>, ExpectraError>;

    fn engine_name(&self) -> &str;
}
