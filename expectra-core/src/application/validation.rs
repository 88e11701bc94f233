// expectra-core/src/application/validation.rs

use tracing::{info, instrument, warn};

use crate::application::metrics::resolve_metrics;
use crate::application::ports::TemplateEngine;
use crate::domain::expectation::{
    ExpectationConfiguration, ExpectationRegistry, ResultFormat, ValidationResult,
};
use crate::error::ExpectraError;
use crate::ports::connector::Connector;

/// Per-run settings that take precedence over what a configuration declares.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfiguration {
    pub result_format: Option<ResultFormat>,
    /// Batch for configurations without a `batch_id`.
    pub default_batch: Option<String>,
}

impl RuntimeConfiguration {
    pub fn with_result_format(mut self, format: ResultFormat) -> Self {
        self.result_format = Some(format);
        self
    }

    pub fn with_default_batch(mut self, batch: impl Into<String>) -> Self {
        self.default_batch = Some(batch.into());
        self
    }
}

/// Validates one configuration against the connector's data.
///
/// Configuration errors always propagate. Errors raised while resolving metrics or
/// evaluating become a failed result when `catch_exceptions` is set.
#[instrument(skip_all, fields(expectation = config.expectation_type(), engine = connector.engine_name()))]
pub async fn validate(
    config: &ExpectationConfiguration,
    registry: &ExpectationRegistry,
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
    runtime: &RuntimeConfiguration,
) -> Result<ValidationResult, ExpectraError> {
    let expectation = registry.build(config)?;
    let format = runtime.result_format.unwrap_or(config.result_format());

    let outcome = async {
        let metrics = resolve_metrics(
            expectation.as_ref(),
            connector,
            renderer,
            runtime.default_batch.as_deref(),
        )
        .await?;
        Ok::<_, ExpectraError>(expectation.evaluate(&metrics)?)
    }
    .await;

    match outcome {
        Ok(verdict) => {
            info!(success = verdict.success, "Expectation evaluated");
            Ok(ValidationResult::from_verdict(verdict, config, format))
        }
        Err(e) if config.catch_exceptions() => {
            warn!(error = %e, "Expectation raised, reporting as failed");
            Ok(ValidationResult::from_exception(config, e.to_string()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::metrics::tests::MockConnector;
    use crate::domain::batch::{BatchData, ColumnValues};
    use crate::domain::error::DomainError;
    use crate::domain::expectation::{ColumnPairRow, UniqueWithConditionKwargs};
    use crate::infrastructure::adapters::{DataFusionConnector, DuckDBConnector};
    use crate::infrastructure::compiler::JinjaRenderer;
    use anyhow::Result;
    use serde_json::json;

    fn scenario_batch() -> BatchData {
        BatchData::new("test")
            .with_column(
                "uuid",
                ColumnValues::Int(vec![Some(1), Some(2), Some(2), Some(3), Some(4), Some(4)]),
            )
            .with_column(
                "is_open",
                ColumnValues::Bool(
                    [true, false, true, true, true, true].map(Some).to_vec(),
                ),
            )
            .with_column(
                "is_open_2",
                ColumnValues::Bool(
                    [false, true, false, false, false, true].map(Some).to_vec(),
                ),
            )
    }

    fn connectors() -> Result<Vec<Box<dyn Connector>>> {
        Ok(vec![
            Box::new(DuckDBConnector::new(":memory:")?),
            Box::new(DataFusionConnector::new()),
        ])
    }

    async fn run(
        connector: &dyn Connector,
        kwargs: UniqueWithConditionKwargs,
    ) -> Result<ValidationResult, ExpectraError> {
        validate(
            &kwargs.into(),
            &ExpectationRegistry::builtin(),
            connector,
            &JinjaRenderer::new(),
            &RuntimeConfiguration::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_duplicates_under_filter_fail() -> Result<()> {
        for connector in connectors()? {
            connector.register_batch(&scenario_batch()).await?;

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open").with_batch("test"),
            )
            .await?;

            assert!(!result.success, "engine {}", connector.engine_name());
            assert_eq!(result.observed_value(), Some(&[ColumnPairRow::new(4, 2)][..]));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_under_filter_passes() -> Result<()> {
        for connector in connectors()? {
            connector.register_batch(&scenario_batch()).await?;

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open_2").with_batch("test"),
            )
            .await?;

            assert!(result.success, "engine {}", connector.engine_name());
            assert!(result.result.is_none());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_expression_filter_and_row_condition() -> Result<()> {
        for connector in connectors()? {
            connector.register_batch(&scenario_batch()).await?;

            // uuid 2 is duplicated only when both flags are ignored
            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open OR is_open_2").with_batch("test"),
            )
            .await?;
            assert!(!result.success);
            let mut values: Vec<_> = result
                .observed_value()
                .unwrap()
                .iter()
                .map(|r| r.value.clone())
                .collect();
            values.sort_by_key(|v| v.as_i64());
            assert_eq!(values, vec![json!(2), json!(4)]);

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open")
                    .with_batch("test")
                    .with_row_condition("uuid < 4"),
            )
            .await?;
            assert!(result.success, "engine {}", connector.engine_name());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_rows_and_filter_rejecting_all_pass() -> Result<()> {
        for connector in connectors()? {
            let empty = BatchData::new("empty")
                .with_column("uuid", ColumnValues::Int(vec![]))
                .with_column("is_open", ColumnValues::Bool(vec![]));
            connector.register_batch(&empty).await?;
            connector.register_batch(&scenario_batch()).await?;

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open").with_batch("empty"),
            )
            .await?;
            assert!(result.success);

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "uuid > 100").with_batch("test"),
            )
            .await?;
            assert!(result.success);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_date_values_reported_identically_by_engines() -> Result<()> {
        let mut observed = Vec::new();
        for connector in connectors()? {
            connector
                .execute(
                    "CREATE TABLE events AS \
                     SELECT CAST('2024-01-01' AS DATE) AS d, true AS f \
                     UNION ALL SELECT CAST('2024-01-01' AS DATE) AS d, true AS f",
                )
                .await?;

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("d", "f").with_batch("events"),
            )
            .await?;

            assert!(!result.success, "engine {}", connector.engine_name());
            observed.push(result.observed_value().map(<[ColumnPairRow]>::to_vec));
        }

        let expected = Some(vec![ColumnPairRow::new("2024-01-01", 2)]);
        assert!(observed.iter().all(|o| *o == expected), "{:?}", observed);
        Ok(())
    }

    #[tokio::test]
    async fn test_mixed_case_batch_name() -> Result<()> {
        for connector in connectors()? {
            let batch = BatchData::new("Orders")
                .with_column("uuid", ColumnValues::Int(vec![Some(1), Some(1)]))
                .with_column("is_open", ColumnValues::Bool(vec![Some(true), Some(true)]));
            connector.register_batch(&batch).await?;

            let result = run(
                connector.as_ref(),
                UniqueWithConditionKwargs::new("uuid", "is_open").with_batch("Orders"),
            )
            .await?;

            assert!(!result.success, "engine {}", connector.engine_name());
            assert_eq!(result.observed_value(), Some(&[ColumnPairRow::new(1, 2)][..]));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_runtime_result_format_overrides_config() -> Result<()> {
        let connector = MockConnector::with_columns(&["uuid", "is_open"])
            .returning(vec![ColumnPairRow::new(4, 2)]);
        let config = UniqueWithConditionKwargs::new("uuid", "is_open")
            .with_batch("test")
            .with_result_format(ResultFormat::Complete)
            .into();

        let result = validate(
            &config,
            &ExpectationRegistry::builtin(),
            &connector,
            &JinjaRenderer::new(),
            &RuntimeConfiguration::default().with_result_format(ResultFormat::BooleanOnly),
        )
        .await?;

        assert!(!result.success);
        assert!(result.result.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_engine_errors_propagate_by_default() {
        let connector = MockConnector::with_columns(&["uuid", "is_open"]).failing();
        let res = run(
            &connector,
            UniqueWithConditionKwargs::new("uuid", "is_open").with_batch("test"),
        )
        .await;
        assert!(matches!(res, Err(ExpectraError::InternalError(_))));
    }

    #[tokio::test]
    async fn test_catch_exceptions_reports_failure() -> Result<()> {
        let connector = MockConnector::with_columns(&["uuid", "is_open"]).failing();
        let result = run(
            &connector,
            UniqueWithConditionKwargs::new("uuid", "is_open")
                .with_batch("test")
                .catching_exceptions(true),
        )
        .await?;

        assert!(!result.success);
        assert!(result.exception_info.raised_exception);
        assert!(
            result
                .exception_info
                .exception_message
                .unwrap()
                .contains("engine exploded")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_never_caught() {
        let connector = MockConnector::with_columns(&["uuid"]);
        let res = run(
            &connector,
            UniqueWithConditionKwargs::new("uuid; DROP TABLE test", "is_open")
                .catching_exceptions(true),
        )
        .await;
        assert!(matches!(
            res,
            Err(ExpectraError::Domain(DomainError::InvalidIdentifier { .. }))
        ));
        assert!(connector.queries().is_empty());
    }

    #[tokio::test]
    async fn test_default_batch_from_runtime() -> Result<()> {
        let connector = DuckDBConnector::new(":memory:")?;
        connector.register_batch(&scenario_batch()).await?;

        let result = validate(
            &UniqueWithConditionKwargs::new("uuid", "is_open_2").into(),
            &ExpectationRegistry::builtin(),
            &connector,
            &JinjaRenderer::new(),
            &RuntimeConfiguration::default().with_default_batch("test"),
        )
        .await?;
        assert!(result.success);
        Ok(())
    }
}
