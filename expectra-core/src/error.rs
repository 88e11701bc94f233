// expectra-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ExpectraError {
    // --- DOMAIN (configuration, metrics, identifiers) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (engines, IO, parsing) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for ExpectraError {
    fn from(err: std::io::Error) -> Self {
        ExpectraError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for ExpectraError {
    fn from(err: duckdb::Error) -> Self {
        ExpectraError::Infrastructure(err.into())
    }
}

impl From<datafusion::error::DataFusionError> for ExpectraError {
    fn from(err: datafusion::error::DataFusionError) -> Self {
        ExpectraError::Infrastructure(err.into())
    }
}
