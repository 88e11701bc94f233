// expectra-core/src/domain/expectation/metrics.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::DomainError;

/// Metric produced by running a query that returns `(value, count)` pairs.
pub const COLUMN_PAIR_METRIC: &str = "query.column_pair";

/// One row of a column-pair query: a value of the tested column and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnPairRow {
    pub value: serde_json::Value,
    pub count: i64,
}

impl ColumnPairRow {
    pub fn new(value: impl Into<serde_json::Value>, count: i64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    ColumnPair(Vec<ColumnPairRow>),
    Scalar(serde_json::Value),
}

/// Named metric values computed by an engine before evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics(BTreeMap<String, MetricValue>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: MetricValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rows of a column-pair metric, in the order the engine returned them.
    pub fn column_pair(&self, name: &str) -> Result<&[ColumnPairRow], DomainError> {
        match self.get(name) {
            Some(MetricValue::ColumnPair(rows)) => Ok(rows),
            Some(MetricValue::Scalar(_)) => Err(DomainError::MalformedMetric {
                metric: name.to_string(),
                expected: "a sequence of (value, count) rows".to_string(),
            }),
            None => Err(DomainError::MissingMetric(name.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_pair_lookup() {
        let metrics = Metrics::new().with(
            COLUMN_PAIR_METRIC,
            MetricValue::ColumnPair(vec![ColumnPairRow::new(4, 2)]),
        );
        let rows = metrics.column_pair(COLUMN_PAIR_METRIC).unwrap();
        assert_eq!(rows, &[ColumnPairRow::new(4, 2)]);
    }

    #[test]
    fn test_missing_and_malformed_metrics() {
        let empty = Metrics::new();
        assert_eq!(
            empty.column_pair(COLUMN_PAIR_METRIC),
            Err(DomainError::MissingMetric(COLUMN_PAIR_METRIC.into()))
        );

        let scalar = Metrics::new().with(COLUMN_PAIR_METRIC, MetricValue::Scalar(json!(3)));
        assert!(matches!(
            scalar.column_pair(COLUMN_PAIR_METRIC),
            Err(DomainError::MalformedMetric { .. })
        ));
    }

    #[test]
    fn test_metrics_deserialize_from_json() {
        let metrics: Metrics = serde_json::from_value(json!({
            "query.column_pair": [{"value": "a", "count": 3}],
            "table.row_count": 6
        }))
        .unwrap();

        assert_eq!(
            metrics.column_pair(COLUMN_PAIR_METRIC).unwrap(),
            &[ColumnPairRow::new("a", 3)]
        );
        assert_eq!(
            metrics.get("table.row_count"),
            Some(&MetricValue::Scalar(json!(6)))
        );
    }
}
