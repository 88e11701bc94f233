// expectra-core/src/domain/expectation/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::expectation::registry::ExpectationKind;

/// How much detail a validation result carries.
///
/// `BOOLEAN_ONLY` drops the result block. `BASIC` carries `observed_value`.
/// `SUMMARY` adds `unexpected_count`, the number of duplicated values. `COMPLETE`
/// has nothing more to add for a query-backed check and matches `SUMMARY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultFormat {
    #[serde(alias = "boolean_only")]
    BooleanOnly,
    #[default]
    #[serde(alias = "basic")]
    Basic,
    #[serde(alias = "summary")]
    Summary,
    #[serde(alias = "complete")]
    Complete,
}

impl ResultFormat {
    pub fn includes_result(&self) -> bool {
        !matches!(self, Self::BooleanOnly)
    }
}

impl std::str::FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BOOLEAN_ONLY" => Ok(Self::BooleanOnly),
            "BASIC" => Ok(Self::Basic),
            "SUMMARY" => Ok(Self::Summary),
            "COMPLETE" => Ok(Self::Complete),
            other => Err(format!(
                "unknown result format '{}' (expected BOOLEAN_ONLY, BASIC, SUMMARY or COMPLETE)",
                other
            )),
        }
    }
}

/// Language used by `row_condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionParser {
    #[default]
    Sql,
}

/// Keyword arguments of `expect_queried_column_to_be_unique_with_condition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UniqueWithConditionKwargs {
    /// Column whose values must be unique.
    #[serde(rename = "column_A")]
    #[validate(length(min = 1, max = 128, message = "column_A must be a column name"))]
    pub column_a: String,

    /// Boolean column name or boolean SQL expression selecting the rows to check.
    #[serde(rename = "column_B")]
    #[validate(length(min = 1, message = "column_B cannot be empty"))]
    pub column_b: String,

    /// Overrides the built-in query template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "query cannot be empty"))]
    pub query: Option<String>,

    // --- Domain ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub batch_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "row_condition cannot be empty"))]
    pub row_condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_parser: Option<ConditionParser>,

    // --- Output ---
    #[serde(default)]
    pub result_format: ResultFormat,

    #[serde(default = "default_include_config")]
    pub include_config: bool,

    #[serde(default)]
    pub catch_exceptions: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

fn default_include_config() -> bool {
    true
}

impl UniqueWithConditionKwargs {
    pub fn new(column_a: impl Into<String>, column_b: impl Into<String>) -> Self {
        Self {
            column_a: column_a.into(),
            column_b: column_b.into(),
            query: None,
            batch_id: None,
            row_condition: None,
            condition_parser: None,
            result_format: ResultFormat::default(),
            include_config: default_include_config(),
            catch_exceptions: false,
            meta: None,
        }
    }

    pub fn with_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    pub fn with_row_condition(mut self, condition: impl Into<String>) -> Self {
        self.row_condition = Some(condition.into());
        self.condition_parser = Some(ConditionParser::Sql);
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_result_format(mut self, format: ResultFormat) -> Self {
        self.result_format = format;
        self
    }

    pub fn catching_exceptions(mut self, catch: bool) -> Self {
        self.catch_exceptions = catch;
        self
    }
}

/// A declared expectation: its type tag plus typed keyword arguments.
///
/// ```yaml
/// expectation_type: expect_queried_column_to_be_unique_with_condition
/// kwargs:
///   column_A: uuid
///   column_B: is_open
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "expectation_type",
    content = "kwargs",
    rename_all = "snake_case"
)]
pub enum ExpectationConfiguration {
    ExpectQueriedColumnToBeUniqueWithCondition(UniqueWithConditionKwargs),
}

impl ExpectationConfiguration {
    pub fn kind(&self) -> ExpectationKind {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(_) => {
                ExpectationKind::QueriedColumnToBeUniqueWithCondition
            }
        }
    }

    pub fn expectation_type(&self) -> &'static str {
        self.kind().name()
    }

    pub fn batch_id(&self) -> Option<&str> {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(k) => k.batch_id.as_deref(),
        }
    }

    pub fn result_format(&self) -> ResultFormat {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(k) => k.result_format,
        }
    }

    pub fn include_config(&self) -> bool {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(k) => k.include_config,
        }
    }

    pub fn catch_exceptions(&self) -> bool {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(k) => k.catch_exceptions,
        }
    }

    pub fn meta(&self) -> Option<&serde_json::Value> {
        match self {
            Self::ExpectQueriedColumnToBeUniqueWithCondition(k) => k.meta.as_ref(),
        }
    }
}

impl From<UniqueWithConditionKwargs> for ExpectationConfiguration {
    fn from(kwargs: UniqueWithConditionKwargs) -> Self {
        Self::ExpectQueriedColumnToBeUniqueWithCondition(kwargs)
    }
}
