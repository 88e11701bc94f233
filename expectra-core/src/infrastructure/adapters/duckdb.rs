// expectra-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime};
use duckdb::types::{TimeUnit, Value};
use duckdb::{Config, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::batch::BatchData;
use crate::domain::compiler::query::quote_identifier;
use crate::domain::expectation::ColumnPairRow;
use crate::error::ExpectraError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector};

pub struct DuckDBConnector {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBConnector {
    /// Opens `db_path`, or an in-memory database for `":memory:"`.
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, ExpectraError> {
        self.conn
            .lock()
            .map_err(|_| InfrastructureError::Database(DatabaseError::Poisoned).into())
    }
}

fn to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// DuckDB values as JSON scalars.
///
/// Dates, times, timestamps and decimals use the same text form as DataFusion's
/// `ScalarValue` display, so both engines report identical evidence. Nested types
/// fall back to their debug rendering.
fn value_to_json(value: Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(b),
        Value::TinyInt(i) => Json::from(i),
        Value::SmallInt(i) => Json::from(i),
        Value::Int(i) => Json::from(i),
        Value::BigInt(i) => Json::from(i),
        Value::HugeInt(i) => i64::try_from(i)
            .map(Json::from)
            .unwrap_or_else(|_| Json::String(i.to_string())),
        Value::UTinyInt(i) => Json::from(i),
        Value::USmallInt(i) => Json::from(i),
        Value::UInt(i) => Json::from(i),
        Value::UBigInt(i) => Json::from(i),
        Value::Float(f) => Json::from(f),
        Value::Double(f) => Json::from(f),
        Value::Text(s) => Json::String(s),
        Value::Decimal(d) => Json::String(d.to_string()),
        Value::Date32(days) => DateTime::from_timestamp(i64::from(days) * 86_400, 0)
            .map(|dt| Json::String(dt.date_naive().to_string()))
            .unwrap_or_else(|| Json::from(days)),
        Value::Timestamp(unit, v) => DateTime::from_timestamp_micros(to_micros(unit, v))
            .map(|dt| Json::String(dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or_else(|| Json::from(v)),
        Value::Time64(unit, v) => {
            let micros = to_micros(unit, v);
            u32::try_from(micros.div_euclid(1_000_000))
                .ok()
                .and_then(|secs| {
                    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                })
                .map(|t| Json::String(t.to_string()))
                .unwrap_or_else(|| Json::from(v))
        }
        other => Json::String(format!("{:?}", other)),
    }
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn execute(&self, query: &str) -> Result<(), ExpectraError> {
        let conn = self.lock()?;
        conn.execute_batch(query)?;
        Ok(())
    }

    async fn table_exists(&self, table_name: &str) -> Result<bool, ExpectraError> {
        let conn = self.lock()?;
        // Quoted identifiers are case-insensitive in DuckDB
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM information_schema.tables WHERE lower(table_name) = lower(?)",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ExpectraError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "PRAGMA table_info('{}')",
            table_name.replace('\'', "''")
        ))?;

        let rows = stmt.query_map([], |row| {
            Ok(ColumnSchema {
                name: row.get("name")?,
                data_type: row.get("type")?,
                is_nullable: !row.get::<_, bool>("notnull")?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }

        Ok(columns)
    }

    async fn register_source(&self, name: &str, path: &Path) -> Result<(), ExpectraError> {
        let query = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto('{}')",
            quote_identifier(name),
            path.to_string_lossy().replace('\'', "''")
        );
        self.execute(&query).await
    }

    async fn register_batch(&self, batch: &BatchData) -> Result<(), ExpectraError> {
        batch.validate()?;

        let conn = self.lock()?;
        conn.execute_batch(&batch.create_table_sql())?;
        if let Some(insert) = batch.insert_sql() {
            conn.execute_batch(&insert)?;
        }
        tracing::debug!(table = %batch.name, rows = batch.num_rows(), "Batch registered in DuckDB");
        Ok(())
    }

    async fn query_column_pair(&self, query: &str) -> Result<Vec<ColumnPairRow>, ExpectraError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let mut rows = stmt.query([])?;

        let mut pairs = Vec::new();
        while let Some(row) = rows.next()? {
            let value: Value = row.get(0)?;
            let count: i64 = row.get(1)?;
            pairs.push(ColumnPairRow {
                value: value_to_json(value),
                count,
            });
        }

        Ok(pairs)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
