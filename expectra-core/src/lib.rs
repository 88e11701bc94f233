// expectra-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// The execution engine contract: register batches, compute metrics.
pub mod ports;

// 2. Domain
// Expectations, verdicts, query compilation. Depends on nothing else.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, DataFusion, minijinja, YAML project files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Metric resolution, validation, suites, diagnostics.
pub mod application;

// --- GLOBAL ERROR ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ExpectraError;
