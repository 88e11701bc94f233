// expectra-core/src/domain/project/configuration.rs

use crate::domain::expectation::ExpectationConfiguration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL engine computing the metrics.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    DuckDB,
    DataFusion,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuckDB => "duckdb",
            Self::DataFusion => "datafusion",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duckdb" => Ok(Self::DuckDB),
            "datafusion" => Ok(Self::DataFusion),
            other => Err(format!(
                "unknown engine '{}' (expected duckdb or datafusion)",
                other
            )),
        }
    }
}

/// A CSV file registered as a batch under `name`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatasetConfig {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(default)]
    pub engine: Engine,

    /// DuckDB database file; ignored by DataFusion.
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    /// Directory scanned for `*.csv` files, each registered under its file stem.
    #[serde(rename = "data-path", default)]
    pub data_path: Option<String>,

    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,

    #[serde(default)]
    pub expectations: Vec<ExpectationConfiguration>,
}

fn default_database() -> String {
    ":memory:".to_string()
}
fn default_target_path() -> String {
    "target".to_string()
}

impl ProjectConfig {
    /// Batch used by expectations that do not name one: the only dataset, if there is exactly one.
    pub fn default_batch(&self) -> Option<&str> {
        match self.datasets.as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_project() {
        let yaml = r#"
name: orders_quality
version: "1.0"
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.engine, Engine::DuckDB);
        assert_eq!(config.database, ":memory:");
        assert_eq!(config.target_path, "target");
        assert!(config.expectations.is_empty());
        assert_eq!(config.default_batch(), None);
    }

    #[test]
    fn test_full_project() {
        let yaml = r#"
name: orders_quality
version: "1.0"
engine: datafusion
target-path: build
datasets:
  - name: orders
    path: data/orders.csv
expectations:
  - expectation_type: expect_queried_column_to_be_unique_with_condition
    kwargs:
      column_A: order_id
      column_B: is_open
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.engine, Engine::DataFusion);
        assert_eq!(config.target_path, "build");
        assert_eq!(config.expectations.len(), 1);
        assert_eq!(config.default_batch(), Some("orders"));
    }

    #[test]
    fn test_engine_from_str() {
        assert_eq!("DuckDB".parse::<Engine>().unwrap(), Engine::DuckDB);
        assert_eq!("datafusion".parse::<Engine>().unwrap(), Engine::DataFusion);
        assert!("sqlite".parse::<Engine>().is_err());
    }
}
