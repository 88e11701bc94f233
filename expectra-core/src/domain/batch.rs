// expectra-core/src/domain/batch.rs

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::compiler::query::{quote_identifier, validate_identifier};
use crate::domain::error::DomainError;

/// Typed, nullable column of an in-memory batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnValues {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Int(_) => "BIGINT",
            Self::Float(_) => "DOUBLE",
            Self::Bool(_) => "BOOLEAN",
            Self::Text(_) => "VARCHAR",
        }
    }

    /// SQL literal for the value at `row`. Out of range rows render as NULL.
    pub fn sql_literal(&self, row: usize) -> String {
        let literal = match self {
            Self::Int(v) => v.get(row).copied().flatten().map(|i| i.to_string()),
            Self::Float(v) => v.get(row).copied().flatten().map(|f| format!("{:?}", f)),
            Self::Bool(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|b| if b { "TRUE" } else { "FALSE" }.to_string()),
            Self::Text(v) => v
                .get(row)
                .cloned()
                .flatten()
                .map(|s| format!("'{}'", s.replace('\'', "''"))),
        };
        literal.unwrap_or_else(|| "NULL".to_string())
    }

    /// Infers the narrowest column type able to hold every non-null value.
    /// Order of preference: bool, integer, float, text. All-null columns are text.
    pub fn infer(column: &str, values: &[Value]) -> Result<Self, DomainError> {
        let non_null: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();

        if !non_null.is_empty() && non_null.iter().all(|v| v.is_boolean()) {
            return Ok(Self::Bool(values.iter().map(Value::as_bool).collect()));
        }
        if !non_null.is_empty() && non_null.iter().all(|v| v.is_i64()) {
            return Ok(Self::Int(values.iter().map(Value::as_i64).collect()));
        }
        if !non_null.is_empty() && non_null.iter().all(|v| v.is_number()) {
            return Ok(Self::Float(values.iter().map(Value::as_f64).collect()));
        }
        if non_null.iter().all(|v| v.is_string()) {
            return Ok(Self::Text(
                values
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ));
        }

        Err(DomainError::InvalidConfiguration(format!(
            "column '{}' mixes incompatible value types",
            column
        )))
    }
}

/// A named in-memory table handed to a connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchData {
    pub name: String,
    pub columns: Vec<(String, ColumnValues)>,
}

impl BatchData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, values: ColumnValues) -> Self {
        self.columns.push((name.into(), values));
        self
    }

    /// Builds a batch from `column -> values` lists, as found in YAML/JSON fixtures.
    pub fn from_json_columns(
        name: &str,
        data: &BTreeMap<String, Vec<Value>>,
    ) -> Result<Self, DomainError> {
        let mut batch = Self::new(name);
        for (column, values) in data {
            batch = batch.with_column(column.clone(), ColumnValues::infer(column, values)?);
        }
        batch.validate()?;
        Ok(batch)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|(_, v)| v.len()).unwrap_or(0)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Checks identifiers and that every column has the same length.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_identifier("batch_id", &self.name)?;
        if self.columns.is_empty() {
            return Err(DomainError::InvalidConfiguration(format!(
                "batch '{}' has no columns",
                self.name
            )));
        }

        let rows = self.num_rows();
        for (column, values) in &self.columns {
            validate_identifier("column", column)?;
            if values.len() != rows {
                return Err(DomainError::InvalidConfiguration(format!(
                    "column '{}' of batch '{}' has {} values, expected {}",
                    column,
                    self.name,
                    values.len(),
                    rows
                )));
            }
        }
        Ok(())
    }

    /// `CREATE TABLE` statement matching the column types.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| format!("{} {}", quote_identifier(name), values.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE OR REPLACE TABLE {} ({})",
            quote_identifier(&self.name),
            columns
        )
    }

    /// `INSERT` statement with every row as literals, `None` when the batch is empty.
    pub fn insert_sql(&self) -> Option<String> {
        let rows = self.num_rows();
        if rows == 0 {
            return None;
        }

        let tuples = (0..rows)
            .map(|row| {
                let values = self
                    .columns
                    .iter()
                    .map(|(_, values)| values.sql_literal(row))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({})", values)
            })
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!(
            "INSERT INTO {} VALUES {}",
            quote_identifier(&self.name),
            tuples
        ))
    }
}
