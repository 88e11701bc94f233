// expectra-core/src/infrastructure/adapters/mod.rs

pub mod datafusion;
pub mod duckdb;

pub use self::datafusion::DataFusionConnector;
pub use self::duckdb::DuckDBConnector;
use crate::domain::project::Engine;
use crate::error::ExpectraError;
use crate::ports::connector::Connector;

/// Builds the connector for `engine`. `database` is only used by DuckDB.
pub fn connect(engine: Engine, database: &str) -> Result<Box<dyn Connector>, ExpectraError> {
    let connector: Box<dyn Connector> = match engine {
        Engine::DuckDB => Box::new(DuckDBConnector::new(database)?),
        Engine::DataFusion => Box::new(DataFusionConnector::new()),
    };
    tracing::debug!(engine = %engine, "Connector ready");
    Ok(connector)
}
