// expectra-core/src/domain/expectation/examples.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::batch::BatchData;
use crate::domain::error::DomainError;
use crate::domain::expectation::configuration::ExpectationConfiguration;
use crate::domain::expectation::registry::ExpectationKind;

/// Example datasets plus the tests run against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectationExample {
    pub data: Vec<DatasetFixture>,
    pub tests: Vec<ExampleTest>,
}

/// In-memory table given as `column -> values`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFixture {
    pub dataset_name: String,
    pub data: BTreeMap<String, Vec<Value>>,
}

impl DatasetFixture {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, values: Vec<Value>) -> Self {
        self.data.insert(name.into(), values);
        self
    }

    pub fn to_batch(&self) -> Result<BatchData, DomainError> {
        BatchData::from_json_columns(&self.dataset_name, &self.data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleTest {
    pub title: String,
    /// When false only the keys present in `output` are compared.
    #[serde(default)]
    pub exact_match_out: bool,
    #[serde(default)]
    pub include_in_gallery: bool,
    #[serde(rename = "in")]
    pub input: Value,
    #[serde(rename = "out")]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_for: Option<Vec<String>>,
}

impl ExampleTest {
    pub fn new(title: impl Into<String>, input: Value, output: Value) -> Self {
        Self {
            title: title.into(),
            exact_match_out: false,
            include_in_gallery: true,
            input,
            output,
            only_for: None,
        }
    }

    pub fn only_for(mut self, engines: &[&str]) -> Self {
        self.only_for = Some(engines.iter().map(|e| e.to_string()).collect());
        self
    }

    pub fn applies_to(&self, engine: &str) -> bool {
        self.only_for
            .as_ref()
            .is_none_or(|engines| engines.iter().any(|e| e.eq_ignore_ascii_case(engine)))
    }

    /// Expectation configuration for this test, bound to `dataset`.
    pub fn configuration(
        &self,
        kind: ExpectationKind,
        dataset: &str,
    ) -> Result<ExpectationConfiguration, DomainError> {
        let Value::Object(input) = &self.input else {
            return Err(DomainError::InvalidConfiguration(format!(
                "example '{}': 'in' must be a mapping",
                self.title
            )));
        };

        let mut kwargs = input.clone();
        kwargs
            .entry("batch_id")
            .or_insert_with(|| Value::String(dataset.to_string()));

        let raw = serde_json::json!({
            "expectation_type": kind.name(),
            "kwargs": kwargs,
        });
        serde_json::from_value(raw).map_err(|e| {
            DomainError::InvalidConfiguration(format!("example '{}': {}", self.title, e))
        })
    }

    /// Compares an actual verdict (as JSON) against `output`.
    pub fn matches(&self, actual: &Value) -> bool {
        if self.exact_match_out {
            return actual == &self.output;
        }
        match (&self.output, actual) {
            (Value::Object(expected), Value::Object(actual)) => expected
                .iter()
                .all(|(key, value)| actual.get(key) == Some(value)),
            (expected, actual) => expected == actual,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn negative() -> ExampleTest {
        ExampleTest::new(
            "basic_negative_test",
            json!({"column_A": "uuid", "column_B": "is_open"}),
            json!({"success": false}),
        )
    }

    #[test]
    fn test_partial_match() {
        let test = negative();
        assert!(test.matches(&json!({"success": false, "result": {"observed_value": []}})));
        assert!(!test.matches(&json!({"success": true})));
    }

    #[test]
    fn test_exact_match() {
        let test = ExampleTest {
            exact_match_out: true,
            ..negative()
        };
        assert!(test.matches(&json!({"success": false})));
        assert!(!test.matches(&json!({"success": false, "result": {"observed_value": []}})));
    }

    #[test]
    fn test_only_for() {
        let test = negative().only_for(&["duckdb"]);
        assert!(test.applies_to("duckdb"));
        assert!(test.applies_to("DuckDB"));
        assert!(!test.applies_to("datafusion"));
        assert!(negative().applies_to("datafusion"));
    }

    #[test]
    fn test_configuration_binds_dataset() {
        let config = negative()
            .configuration(ExpectationKind::QueriedColumnToBeUniqueWithCondition, "test")
            .unwrap();
        assert_eq!(config.batch_id(), Some("test"));
        assert_eq!(
            config.expectation_type(),
            "expect_queried_column_to_be_unique_with_condition"
        );
    }

    #[test]
    fn test_configuration_rejects_non_mapping_input() {
        let test = ExampleTest::new("broken", json!(["uuid"]), json!({"success": true}));
        let res = test.configuration(ExpectationKind::QueriedColumnToBeUniqueWithCondition, "t");
        assert!(matches!(res, Err(DomainError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_fixture_yaml() {
        let yaml = r#"
dataset_name: test
data:
  uuid: [1, 2, 2]
  is_open: [true, false, true]
"#;
        let fixture: DatasetFixture = serde_yaml::from_str(yaml).unwrap();
        let batch = fixture.to_batch().unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.column_names().collect::<Vec<_>>(), vec!["is_open", "uuid"]);
    }
}
