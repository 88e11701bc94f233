// expectra-core/src/application/mod.rs

pub mod clean;
pub mod diagnostics;
pub mod engine;
pub mod metrics;
pub mod ports;
pub mod suite;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI imports `expectra_core::application::{run_suite, validate, ...}`
// without knowing the file layout.

pub use clean::clean_project;
pub use diagnostics::{DiagnosticChecklist, ExampleOutcome, run_examples};
pub use engine::execute_query;
pub use metrics::resolve_metrics;
pub use suite::{SuiteResult, SuiteStatistics, run_suite};
pub use validation::{RuntimeConfiguration, validate};
