pub mod batch;
pub mod compiler;
pub mod error;
pub mod expectation;
pub mod project;

// Re-exports to keep imports short elsewhere
pub use batch::{BatchData, ColumnValues};
pub use error::DomainError;
