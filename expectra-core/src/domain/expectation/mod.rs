// expectra-core/src/domain/expectation/mod.rs

pub mod configuration;
pub mod examples;
pub mod library;
pub mod metrics;
pub mod registry;
pub mod unique_with_condition;
pub mod verdict;

pub use configuration::{
    ConditionParser, ExpectationConfiguration, ResultFormat, UniqueWithConditionKwargs,
};
pub use examples::{DatasetFixture, ExampleTest, ExpectationExample};
pub use library::LibraryMetadata;
pub use metrics::{COLUMN_PAIR_METRIC, ColumnPairRow, MetricValue, Metrics};
pub use registry::{ExpectationKind, ExpectationRegistry};
pub use unique_with_condition::UniqueWithCondition;
pub use verdict::{ExceptionInfo, ValidationResult, Verdict, VerdictDetails};

use crate::domain::compiler::QuerySpec;
use crate::domain::error::DomainError;

/// A configured, query-based data quality rule.
///
/// Implementations are immutable once built and `evaluate` must be a pure
/// function of the metrics it is given.
pub trait Expectation: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> ExpectationKind;

    /// Query the engine must run to produce this expectation's metrics.
    fn query_spec(&self) -> QuerySpec<'_>;

    fn evaluate(&self, metrics: &Metrics) -> Result<Verdict, DomainError>;
}
