// expectra-core/src/application/engine.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::expectation::ColumnPairRow;
use crate::error::ExpectraError;
use crate::ports::connector::Connector;

/// Runs a `(value, count)` query through the connector with timing logs.
#[instrument(skip(connector, query), fields(engine = connector.engine_name(), query.len = query.len()))]
pub async fn execute_query(
    connector: &dyn Connector,
    query: &str,
) -> Result<Vec<ColumnPairRow>, ExpectraError> {
    let start = Instant::now();
    debug!("Executing query: {}", query);

    let result = connector.query_column_pair(query).await;
    let duration = start.elapsed();

    match result {
        Ok(rows) => {
            debug!(rows = rows.len(), "Query finished in {:.2?}", duration);
            Ok(rows)
        }
        Err(e) => {
            error!("Query failed after {:.2?}: {}", duration, e);
            Err(e)
        }
    }
}
