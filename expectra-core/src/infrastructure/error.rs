// expectra-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(expectra::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("DataFusion Engine Error: {0}")]
    #[diagnostic(
        code(expectra::infra::database::datafusion),
        help("An error occurred while planning or executing the query.")
    )]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Unexpected query result: {0}")]
    #[diagnostic(
        code(expectra::infra::database::result_shape),
        help("Query templates must return (value, count) rows.")
    )]
    ResultShape(String),

    #[error("Connection lock poisoned")]
    #[diagnostic(code(expectra::infra::database::poisoned))]
    Poisoned,
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(expectra::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML / JSON ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(expectra::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(expectra::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(expectra::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(
        code(expectra::infra::config_missing),
        help("Create an expectra.yaml at the project root.")
    )]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(expectra::infra::template),
        help("Query templates may only use {{{{ column_A }}}}, {{{{ column_B }}}} and {{{{ active_batch }}}}.")
    )]
    TemplateError(#[from] minijinja::Error),
}

// Shortcuts for `?` on engine calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<datafusion::error::DataFusionError> for InfrastructureError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        InfrastructureError::Database(DatabaseError::DataFusion(err))
    }
}
