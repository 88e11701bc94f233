// expectra-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid SQL identifier '{name}' for '{key}'")]
    #[diagnostic(
        code(expectra::domain::identifier),
        help("Identifiers must match [A-Za-z_][A-Za-z0-9_]* and be at most 128 characters.")
    )]
    InvalidIdentifier { key: String, name: String },

    #[error("Invalid SQL expression for '{key}': {reason}")]
    #[diagnostic(
        code(expectra::domain::expression),
        help("Provide a boolean column name or a single boolean expression (no ';', no subqueries).")
    )]
    InvalidExpression { key: String, reason: String },

    #[error("Invalid expectation configuration: {0}")]
    #[diagnostic(code(expectra::domain::configuration))]
    InvalidConfiguration(String),

    #[error("Invalid query: {0}")]
    #[diagnostic(
        code(expectra::domain::query),
        help("The rendered query must be exactly one SELECT statement.")
    )]
    InvalidQuery(String),

    #[error("Metric '{0}' was not provided")]
    #[diagnostic(code(expectra::domain::missing_metric))]
    MissingMetric(String),

    #[error("Metric '{metric}' has an unexpected shape: expected {expected}")]
    #[diagnostic(code(expectra::domain::malformed_metric))]
    MalformedMetric { metric: String, expected: String },

    #[error("Unknown expectation type '{0}'")]
    #[diagnostic(
        code(expectra::domain::unknown_expectation),
        help("Run `expectra list` to see the registered expectations.")
    )]
    UnknownExpectation(String),

    #[error("Column '{column}' not found in batch '{batch}'")]
    #[diagnostic(code(expectra::domain::column_not_found))]
    ColumnNotFound { batch: String, column: String },

    #[error("Batch '{0}' is not registered")]
    #[diagnostic(
        code(expectra::domain::batch_not_found),
        help("Declare it under `datasets:` or pass `batch_id` explicitly.")
    )]
    BatchNotFound(String),
}
