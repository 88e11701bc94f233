// expectra-core/src/application/metrics.rs

use tracing::{debug, instrument};

use crate::application::engine::execute_query;
use crate::application::ports::TemplateEngine;
use crate::domain::compiler::query::ensure_single_select;
use crate::domain::error::DomainError;
use crate::domain::expectation::{COLUMN_PAIR_METRIC, Expectation, MetricValue, Metrics};
use crate::error::ExpectraError;
use crate::ports::connector::Connector;

/// Computes every metric the expectation depends on.
///
/// The batch is the expectation's own `batch_id`, else `default_batch`.
#[instrument(skip_all, fields(expectation = expectation.kind().name()))]
pub async fn resolve_metrics(
    expectation: &dyn Expectation,
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
    default_batch: Option<&str>,
) -> Result<Metrics, ExpectraError> {
    let spec = expectation.query_spec();
    let table = spec
        .batch_id
        .or(default_batch)
        .ok_or_else(|| DomainError::BatchNotFound("<no batch_id configured>".into()))?;

    // 1. Batch and referenced columns must exist
    if !connector.table_exists(table).await? {
        return Err(DomainError::BatchNotFound(table.to_string()).into());
    }
    let columns = connector.fetch_columns(table).await?;

    let referenced = std::iter::once(spec.column).chain(spec.filter.column());
    for column in referenced {
        if !columns.iter().any(|c| c.name == column) {
            return Err(DomainError::ColumnNotFound {
                batch: table.to_string(),
                column: column.to_string(),
            }
            .into());
        }
    }

    // 2. Render
    let rendered = renderer.render(spec.template.as_str(), &spec.bindings(table))?;

    // 3. Shape check, then run
    let sql = ensure_single_select(&rendered)?;
    debug!(table, "Resolved query: {}", sql);

    let rows = execute_query(connector, &sql).await?;
    Ok(Metrics::new().with(COLUMN_PAIR_METRIC, MetricValue::ColumnPair(rows)))
}
