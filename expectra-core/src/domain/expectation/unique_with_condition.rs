// expectra-core/src/domain/expectation/unique_with_condition.rs

// Expect the values of `column_A` to be distinct among the rows where `column_B` holds.
//
// The check never touches data. The engine runs the query below and returns the
// `(value, count)` groups that occur more than once; an empty answer is a pass.

use serde_json::json;
use validator::Validate;

use crate::domain::compiler::query::{parse_expression, validate_identifier};
use crate::domain::compiler::{FilterExpression, QuerySpec, QueryTemplate};
use crate::domain::error::DomainError;
use crate::domain::expectation::Expectation;
use crate::domain::expectation::configuration::UniqueWithConditionKwargs;
use crate::domain::expectation::examples::{DatasetFixture, ExampleTest, ExpectationExample};
use crate::domain::expectation::library::LibraryMetadata;
use crate::domain::expectation::metrics::{COLUMN_PAIR_METRIC, Metrics};
use crate::domain::expectation::registry::ExpectationKind;
use crate::domain::expectation::verdict::Verdict;

pub const DEFAULT_QUERY: &str = "
    SELECT {{ column_A }}, COUNT(1)
    FROM {{ active_batch }}
    WHERE {{ column_B }}
    GROUP BY {{ column_A }}
    HAVING count(1) > 1
";

/// A validated `expect_queried_column_to_be_unique_with_condition` check, ready to render its query.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueWithCondition {
    kwargs: UniqueWithConditionKwargs,
    filter: FilterExpression,
    template: QueryTemplate,
    row_condition: Option<String>,
}

impl UniqueWithCondition {
    pub const EXPECTATION_TYPE: &'static str = "expect_queried_column_to_be_unique_with_condition";

    pub const DESCRIPTION: &'static str = "Expect column values to be distinct, with a filter. \
        column_A is the column to check for uniqueness. column_B is the filter: \
        a boolean column name (rows where it is true) or a boolean SQL expression.";

    pub const METRIC_DEPENDENCIES: &'static [&'static str] = &[COLUMN_PAIR_METRIC];
    pub const SUCCESS_KEYS: &'static [&'static str] = &["column_A", "column_B", "query"];
    pub const DOMAIN_KEYS: &'static [&'static str] =
        &["batch_id", "row_condition", "condition_parser"];

    pub fn try_new(kwargs: UniqueWithConditionKwargs) -> Result<Self, DomainError> {
        kwargs
            .validate()
            .map_err(|e| DomainError::InvalidConfiguration(e.to_string()))?;

        validate_identifier("column_A", &kwargs.column_a)?;
        let filter = FilterExpression::parse("column_B", &kwargs.column_b)?;

        if let Some(batch_id) = &kwargs.batch_id {
            validate_identifier("batch_id", batch_id)?;
        }

        let row_condition = kwargs
            .row_condition
            .as_deref()
            .map(|condition| parse_expression("row_condition", condition))
            .transpose()?;

        let template = QueryTemplate::parse(kwargs.query.as_deref().unwrap_or(DEFAULT_QUERY))?;

        Ok(Self {
            kwargs,
            filter,
            template,
            row_condition,
        })
    }

    pub fn kwargs(&self) -> &UniqueWithConditionKwargs {
        &self.kwargs
    }

    pub fn column(&self) -> &str {
        &self.kwargs.column_a
    }

    pub fn filter(&self) -> &FilterExpression {
        &self.filter
    }

    pub fn library_metadata() -> LibraryMetadata {
        LibraryMetadata::new(&["query-based"], &["@itaise"])
    }

    /// Self-test fixtures: duplicate `uuid`s under two different filter columns.
    pub fn examples() -> Vec<ExpectationExample> {
        let dataset = DatasetFixture::new("test")
            .column("uuid", vec![json!(1), json!(2), json!(2), json!(3), json!(4), json!(4)])
            .column(
                "is_open",
                vec![json!(true), json!(false), json!(true), json!(true), json!(true), json!(true)],
            )
            .column(
                "is_open_2",
                vec![json!(false), json!(true), json!(false), json!(false), json!(false), json!(true)],
            );

        let engines = &["duckdb", "datafusion"];
        vec![ExpectationExample {
            data: vec![dataset],
            tests: vec![
                ExampleTest::new(
                    "basic_negative_test",
                    json!({"column_A": "uuid", "column_B": "is_open"}),
                    json!({"success": false}),
                )
                .only_for(engines),
                ExampleTest::new(
                    "basic_positive_test",
                    json!({"column_A": "uuid", "column_B": "is_open_2"}),
                    json!({"success": true}),
                )
                .only_for(engines),
            ],
        }]
    }
}

impl Expectation for UniqueWithCondition {
    fn kind(&self) -> ExpectationKind {
        ExpectationKind::QueriedColumnToBeUniqueWithCondition
    }

    fn query_spec(&self) -> QuerySpec<'_> {
        QuerySpec {
            template: &self.template,
            column: &self.kwargs.column_a,
            filter: &self.filter,
            batch_id: self.kwargs.batch_id.as_deref(),
            row_condition: self.row_condition.as_deref(),
        }
    }

    fn evaluate(&self, metrics: &Metrics) -> Result<Verdict, DomainError> {
        let duplicates = metrics.column_pair(COLUMN_PAIR_METRIC)?;
        if duplicates.is_empty() {
            return Ok(Verdict::pass());
        }
        Ok(Verdict::fail(duplicates.to_vec()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::expectation::metrics::{ColumnPairRow, MetricValue};

    fn check() -> UniqueWithCondition {
        UniqueWithCondition::try_new(UniqueWithConditionKwargs::new("uuid", "is_open")).unwrap()
    }

    fn metrics(rows: Vec<ColumnPairRow>) -> Metrics {
        Metrics::new().with(COLUMN_PAIR_METRIC, MetricValue::ColumnPair(rows))
    }

    #[test]
    fn test_empty_result_passes() {
        let verdict = check().evaluate(&metrics(vec![])).unwrap();
        assert_eq!(verdict, Verdict::pass());
        assert!(verdict.result.is_none());
    }

    #[test]
    fn test_duplicates_fail_with_evidence() {
        let rows = vec![ColumnPairRow::new(4, 2)];
        let verdict = check().evaluate(&metrics(rows.clone())).unwrap();
        assert!(!verdict.success);
        assert_eq!(verdict.result.unwrap().observed_value, rows);
    }

    #[test]
    fn test_evidence_is_kept_verbatim() {
        // Same value twice and a descending order must survive as-is.
        let rows = vec![
            ColumnPairRow::new("b", 5),
            ColumnPairRow::new("a", 2),
            ColumnPairRow::new("b", 3),
            ColumnPairRow::new(serde_json::Value::Null, 2),
        ];
        let verdict = check().evaluate(&metrics(rows.clone())).unwrap();
        assert_eq!(verdict, Verdict::fail(rows));
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let check = check();
        let metrics = metrics(vec![ColumnPairRow::new(1, 2), ColumnPairRow::new(7, 9)]);
        assert_eq!(
            check.evaluate(&metrics).unwrap(),
            check.evaluate(&metrics).unwrap()
        );
    }

    #[test]
    fn test_missing_metric_is_an_error() {
        let res = check().evaluate(&Metrics::new());
        assert_eq!(res, Err(DomainError::MissingMetric(COLUMN_PAIR_METRIC.into())));
    }

    #[test]
    fn test_construction_rejects_bad_identifiers() {
        let res = UniqueWithCondition::try_new(UniqueWithConditionKwargs::new(
            "uuid; DROP TABLE test",
            "is_open",
        ));
        assert!(matches!(res, Err(DomainError::InvalidIdentifier { .. })));

        let res = UniqueWithCondition::try_new(
            UniqueWithConditionKwargs::new("uuid", "is_open").with_batch("test--"),
        );
        assert!(matches!(res, Err(DomainError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_construction_rejects_bad_filters() {
        let res = UniqueWithCondition::try_new(UniqueWithConditionKwargs::new(
            "uuid",
            "is_open; DELETE FROM test",
        ));
        assert!(matches!(res, Err(DomainError::InvalidExpression { .. })));

        let res = UniqueWithCondition::try_new(
            UniqueWithConditionKwargs::new("uuid", "is_open").with_row_condition("1 = 1)"),
        );
        assert!(matches!(res, Err(DomainError::InvalidExpression { .. })));
    }

    #[test]
    fn test_custom_query_must_reference_placeholders() {
        let res = UniqueWithCondition::try_new(
            UniqueWithConditionKwargs::new("uuid", "is_open")
                .with_query("SELECT {column_A}, COUNT(1) FROM {active_batch} GROUP BY {column_A}"),
        );
        assert!(matches!(res, Err(DomainError::InvalidQuery(_))));
    }

    #[test]
    fn test_query_spec() {
        let check = UniqueWithCondition::try_new(
            UniqueWithConditionKwargs::new("uuid", "uuid > 1 and is_open")
                .with_batch("test")
                .with_row_condition("uuid < 10"),
        )
        .unwrap();

        let spec = check.query_spec();
        assert_eq!(spec.column, "uuid");
        assert_eq!(spec.batch_id, Some("test"));
        assert_eq!(spec.row_condition, Some("uuid < 10"));
        assert_eq!(
            spec.bindings("test"),
            json!({
                "column_A": "\"uuid\"",
                "column_B": "uuid > 1 AND is_open",
                "active_batch": "(SELECT * FROM \"test\" WHERE uuid < 10) AS active_batch",
            })
        );
    }

    #[test]
    fn test_examples_cover_both_outcomes() {
        let examples = UniqueWithCondition::examples();
        assert_eq!(examples.len(), 1);
        let outcomes: Vec<_> = examples[0]
            .tests
            .iter()
            .map(|t| t.output["success"].clone())
            .collect();
        assert_eq!(outcomes, vec![json!(false), json!(true)]);
        assert_eq!(examples[0].data[0].to_batch().unwrap().num_rows(), 6);
    }
}
