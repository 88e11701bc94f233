// expectra-core/src/application/suite.rs

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument};

use crate::application::ports::TemplateEngine;
use crate::application::validation::{RuntimeConfiguration, validate};
use crate::domain::expectation::{ExpectationRegistry, ValidationResult};
use crate::domain::project::ProjectConfig;
use crate::error::ExpectraError;
use crate::infrastructure::fs::write_json;
use crate::ports::connector::Connector;

pub const RESULTS_FILE: &str = "validation_results.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteStatistics {
    pub evaluated_expectations: usize,
    pub successful_expectations: usize,
    pub unsuccessful_expectations: usize,
    /// `None` when nothing was evaluated.
    pub success_percent: Option<f64>,
}

impl SuiteStatistics {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let evaluated = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            evaluated_expectations: evaluated,
            successful_expectations: successful,
            unsuccessful_expectations: evaluated - successful,
            success_percent: (evaluated > 0)
                .then(|| successful as f64 / evaluated as f64 * 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite_name: String,
    pub engine: String,
    pub success: bool,
    pub evaluated_at: DateTime<Utc>,
    pub statistics: SuiteStatistics,
    pub results: Vec<ValidationResult>,
}

/// Registers the project's datasets, then validates every expectation in declaration order.
///
/// The result is also written to `<target-path>/validation_results.json`.
#[instrument(skip_all, fields(project = %config.name, engine = connector.engine_name()))]
pub async fn run_suite(
    project_dir: &Path,
    config: &ProjectConfig,
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
) -> Result<SuiteResult, ExpectraError> {
    let start = Instant::now();
    let evaluated_at = Utc::now();

    // 1. Datasets
    try_join_all(config.datasets.iter().map(|dataset| {
        let path = project_dir.join(&dataset.path);
        async move {
            info!(name = %dataset.name, path = ?path, "Registering dataset");
            connector.register_source(&dataset.name, &path).await
        }
    }))
    .await?;

    // 2. Expectations, sequentially
    let registry = ExpectationRegistry::builtin();
    let mut runtime = RuntimeConfiguration::default();
    runtime.default_batch = config.default_batch().map(str::to_string);

    let mut results = Vec::with_capacity(config.expectations.len());
    for expectation in &config.expectations {
        results.push(validate(expectation, &registry, connector, renderer, &runtime).await?);
    }

    let statistics = SuiteStatistics::from_results(&results);
    let suite = SuiteResult {
        suite_name: config.name.clone(),
        engine: connector.engine_name().to_string(),
        success: statistics.unsuccessful_expectations == 0,
        evaluated_at,
        statistics,
        results,
    };

    // 3. Artifact
    let output = results_path(project_dir, config);
    write_json(&output, &suite)?;

    info!(
        success = suite.success,
        evaluated = suite.statistics.evaluated_expectations,
        "Suite finished in {:.2?}",
        start.elapsed()
    );
    Ok(suite)
}

pub fn results_path(project_dir: &Path, config: &ProjectConfig) -> PathBuf {
    project_dir.join(&config.target_path).join(RESULTS_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::project::DatasetConfig;
    use crate::domain::expectation::UniqueWithConditionKwargs;
    use crate::infrastructure::adapters::DuckDBConnector;
    use crate::infrastructure::compiler::JinjaRenderer;
    use anyhow::Result;
    use std::fs;

    const ORDERS: &str = "order_id,customer,is_open\n1,ann,true\n2,bob,true\n2,bob,false\n3,cid,true\n3,cid,true\n";

    fn project(expectations: Vec<UniqueWithConditionKwargs>) -> ProjectConfig {
        ProjectConfig {
            name: "orders_quality".into(),
            version: "1.0".into(),
            engine: Default::default(),
            database: ":memory:".into(),
            target_path: "target".into(),
            data_path: None,
            datasets: vec![DatasetConfig {
                name: "orders".into(),
                path: "orders.csv".into(),
            }],
            expectations: expectations.into_iter().map(Into::into).collect(),
        }
    }

    #[tokio::test]
    async fn test_run_suite_writes_results() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("orders.csv"), ORDERS)?;
        let config = project(vec![
            UniqueWithConditionKwargs::new("order_id", "is_open"),
            UniqueWithConditionKwargs::new("customer", "order_id < 3 AND is_open"),
        ]);

        let connector = DuckDBConnector::new(":memory:")?;
        let suite = run_suite(dir.path(), &config, &connector, &JinjaRenderer::new()).await?;

        assert!(!suite.success);
        assert_eq!(suite.results.len(), 2);
        assert!(!suite.results[0].success);
        assert!(suite.results[1].success);
        assert_eq!(suite.statistics.successful_expectations, 1);
        assert_eq!(suite.statistics.success_percent, Some(50.0));

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(results_path(dir.path(), &config))?)?;
        assert_eq!(written["suite_name"], "orders_quality");
        assert_eq!(written["results"][0]["result"]["observed_value"][0]["value"], 3);
        assert_eq!(written["results"][0]["result"]["observed_value"][0]["count"], 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_suite_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("orders.csv"), ORDERS)?;
        let config = project(vec![]);

        let connector = DuckDBConnector::new(":memory:")?;
        let suite = run_suite(dir.path(), &config, &connector, &JinjaRenderer::new()).await?;

        assert!(suite.success);
        assert_eq!(suite.statistics.success_percent, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_suite_missing_dataset_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = project(vec![UniqueWithConditionKwargs::new("order_id", "is_open")]);

        let connector = DuckDBConnector::new(":memory:")?;
        let res = run_suite(dir.path(), &config, &connector, &JinjaRenderer::new()).await;
        assert!(res.is_err());
        assert!(!results_path(dir.path(), &config).exists());
        Ok(())
    }
}
