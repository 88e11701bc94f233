// expectra-core/src/infrastructure/adapters/datafusion.rs

use async_trait::async_trait;
use datafusion::arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, RecordBatch, StringArray,
};
use datafusion::arrow::datatypes::{DataType, Field, Schema};
use datafusion::common::TableReference;
use datafusion::datasource::MemTable;
use datafusion::error::DataFusionError;
use datafusion::prelude::*;
use datafusion::scalar::ScalarValue;
use std::path::Path;
use std::sync::Arc;

use crate::domain::batch::{BatchData, ColumnValues};
use crate::domain::expectation::ColumnPairRow;
use crate::error::ExpectraError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector};

/// In-process Apache DataFusion engine. Tables live in the session's memory catalog.
///
/// DataFusion folds unquoted identifiers to lowercase. The query compiler quotes table
/// and column names, so tables are registered and looked up through
/// `TableReference::bare`, which keeps the name exactly as given. Free-form filter
/// expressions are not quoted.
pub struct DataFusionConnector {
    ctx: Arc<SessionContext>,
}

impl Default for DataFusionConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl DataFusionConnector {
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(SessionContext::new()),
        }
    }

    fn replace_table(&self, name: &str) -> Result<(), DataFusionError> {
        if self.ctx.table_exist(TableReference::bare(name))? {
            self.ctx.deregister_table(TableReference::bare(name))?;
        }
        Ok(())
    }

    fn to_record_batch(batch: &BatchData) -> Result<RecordBatch, DataFusionError> {
        let mut fields = Vec::with_capacity(batch.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(batch.columns.len());

        for (name, values) in &batch.columns {
            let (data_type, array): (DataType, ArrayRef) = match values {
                ColumnValues::Int(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
                ColumnValues::Float(v) => {
                    (DataType::Float64, Arc::new(Float64Array::from(v.clone())))
                }
                ColumnValues::Bool(v) => {
                    (DataType::Boolean, Arc::new(BooleanArray::from(v.clone())))
                }
                ColumnValues::Text(v) => (DataType::Utf8, Arc::new(StringArray::from(v.clone()))),
            };
            fields.push(Field::new(name, data_type, true));
            arrays.push(array);
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(DataFusionError::from)
    }
}

fn scalar_to_json(value: &ScalarValue) -> serde_json::Value {
    use serde_json::Value as Json;

    if value.is_null() {
        return Json::Null;
    }
    match value {
        ScalarValue::Boolean(Some(b)) => Json::Bool(*b),
        ScalarValue::Int8(Some(i)) => Json::from(*i),
        ScalarValue::Int16(Some(i)) => Json::from(*i),
        ScalarValue::Int32(Some(i)) => Json::from(*i),
        ScalarValue::Int64(Some(i)) => Json::from(*i),
        ScalarValue::UInt8(Some(i)) => Json::from(*i),
        ScalarValue::UInt16(Some(i)) => Json::from(*i),
        ScalarValue::UInt32(Some(i)) => Json::from(*i),
        ScalarValue::UInt64(Some(i)) => Json::from(*i),
        ScalarValue::Float32(Some(f)) => Json::from(*f),
        ScalarValue::Float64(Some(f)) => Json::from(*f),
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => Json::String(s.clone()),
        other => Json::String(other.to_string()),
    }
}

fn scalar_to_count(value: &ScalarValue) -> Result<i64, DatabaseError> {
    match value {
        ScalarValue::Int64(Some(c)) => Ok(*c),
        ScalarValue::Int32(Some(c)) => Ok(i64::from(*c)),
        ScalarValue::UInt64(Some(c)) => i64::try_from(*c)
            .map_err(|_| DatabaseError::ResultShape(format!("count {} overflows i64", c))),
        other => Err(DatabaseError::ResultShape(format!(
            "second column must be an integer count, got {:?}",
            other
        ))),
    }
}

#[async_trait]
impl Connector for DataFusionConnector {
    async fn execute(&self, query: &str) -> Result<(), ExpectraError> {
        let df = self.ctx.sql(query).await?;
        // Collect to trigger execution
        df.collect().await?;
        Ok(())
    }

    async fn table_exists(&self, table_name: &str) -> Result<bool, ExpectraError> {
        Ok(self.ctx.table_exist(TableReference::bare(table_name))?)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, ExpectraError> {
        let df = self.ctx.table(TableReference::bare(table_name)).await?;

        let columns = df
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnSchema {
                name: field.name().clone(),
                data_type: format!("{:?}", field.data_type()),
                is_nullable: field.is_nullable(),
            })
            .collect();

        Ok(columns)
    }

    async fn register_source(&self, name: &str, path: &Path) -> Result<(), ExpectraError> {
        let path_str = path.to_str().ok_or_else(|| {
            ExpectraError::InternalError(format!("Invalid path for source {}: {:?}", name, path))
        })?;

        self.replace_table(name)?;
        self.ctx
            .register_csv(TableReference::bare(name), path_str, CsvReadOptions::new())
            .await?;
        Ok(())
    }

    async fn register_batch(&self, batch: &BatchData) -> Result<(), ExpectraError> {
        batch.validate()?;

        let record_batch = Self::to_record_batch(batch)?;
        let table = MemTable::try_new(record_batch.schema(), vec![vec![record_batch]])?;
        self.replace_table(&batch.name)?;
        self.ctx
            .register_table(TableReference::bare(batch.name.as_str()), Arc::new(table))?;
        tracing::debug!(table = %batch.name, rows = batch.num_rows(), "Batch registered in DataFusion");
        Ok(())
    }

    async fn query_column_pair(&self, query: &str) -> Result<Vec<ColumnPairRow>, ExpectraError> {
        let batches = self.ctx.sql(query).await?.collect().await?;

        let mut pairs = Vec::new();
        for batch in &batches {
            if batch.num_columns() < 2 {
                return Err(InfrastructureError::Database(DatabaseError::ResultShape(format!(
                    "expected 2 columns, got {}",
                    batch.num_columns()
                )))
                .into());
            }

            let values = batch.column(0);
            let counts = batch.column(1);
            for row in 0..batch.num_rows() {
                let value = ScalarValue::try_from_array(values, row)?;
                let count = ScalarValue::try_from_array(counts, row)?;
                pairs.push(ColumnPairRow {
                    value: scalar_to_json(&value),
                    count: scalar_to_count(&count).map_err(InfrastructureError::Database)?,
                });
            }
        }

        Ok(pairs)
    }

    fn engine_name(&self) -> &str {
        "datafusion"
    }
}
