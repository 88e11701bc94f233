// expectra-core/src/domain/expectation/verdict.rs

use serde::{Deserialize, Serialize};

use crate::domain::expectation::configuration::{ExpectationConfiguration, ResultFormat};
use crate::domain::expectation::metrics::ColumnPairRow;

/// Evidence attached to a failing verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictDetails {
    pub observed_value: Vec<ColumnPairRow>,
    /// Number of duplicated values. Set from `SUMMARY` upwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_count: Option<usize>,
}

impl VerdictDetails {
    fn shaped(self, format: ResultFormat) -> Option<Self> {
        if !format.includes_result() {
            return None;
        }
        let unexpected_count = matches!(format, ResultFormat::Summary | ResultFormat::Complete)
            .then(|| self.observed_value.len());
        Some(Self {
            unexpected_count,
            ..self
        })
    }
}

/// Pass/fail outcome of `Expectation::evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerdictDetails>,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            success: true,
            result: None,
        }
    }

    pub fn fail(observed_value: Vec<ColumnPairRow>) -> Self {
        Self {
            success: false,
            result: Some(VerdictDetails {
                observed_value,
                unexpected_count: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub raised_exception: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_message: Option<String>,
}

/// A verdict shaped for reporting: result format applied, configuration and meta attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub success: bool,
    pub expectation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerdictDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectation_config: Option<ExpectationConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub exception_info: ExceptionInfo,
}

impl ValidationResult {
    pub fn from_verdict(
        verdict: Verdict,
        config: &ExpectationConfiguration,
        format: ResultFormat,
    ) -> Self {
        Self {
            success: verdict.success,
            expectation_type: config.expectation_type().to_string(),
            result: verdict.result.and_then(|details| details.shaped(format)),
            expectation_config: config.include_config().then(|| config.clone()),
            meta: config.meta().cloned(),
            exception_info: ExceptionInfo::default(),
        }
    }

    /// Failed result standing in for an error when `catch_exceptions` is set.
    pub fn from_exception(config: &ExpectationConfiguration, message: impl Into<String>) -> Self {
        Self {
            success: false,
            expectation_type: config.expectation_type().to_string(),
            result: None,
            expectation_config: config.include_config().then(|| config.clone()),
            meta: config.meta().cloned(),
            exception_info: ExceptionInfo {
                raised_exception: true,
                exception_message: Some(message.into()),
            },
        }
    }

    pub fn observed_value(&self) -> Option<&[ColumnPairRow]> {
        self.result.as_ref().map(|r| r.observed_value.as_slice())
    }
}
