// expectra-core/src/application/diagnostics.rs

// Runs an expectation's built-in examples on a live engine and summarizes
// whether the expectation is complete enough to ship.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{instrument, warn};

use crate::application::ports::TemplateEngine;
use crate::application::validation::{RuntimeConfiguration, validate};
use crate::domain::expectation::{ExpectationKind, ExpectationRegistry, Verdict};
use crate::error::ExpectraError;
use crate::ports::connector::Connector;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleOutcome {
    pub title: String,
    pub dataset: String,
    pub passed: bool,
    pub expected: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Registers every example dataset and runs the tests that apply to the connector's engine.
///
/// A failing or erroring test is reported in its outcome, not returned as an error.
#[instrument(skip_all, fields(expectation = kind.name(), engine = connector.engine_name()))]
pub async fn run_examples(
    kind: ExpectationKind,
    connector: &dyn Connector,
    renderer: &dyn TemplateEngine,
) -> Result<Vec<ExampleOutcome>, ExpectraError> {
    let registry = ExpectationRegistry::builtin();
    let runtime = RuntimeConfiguration::default();
    let mut outcomes = Vec::new();

    for example in kind.examples() {
        for fixture in &example.data {
            connector.register_batch(&fixture.to_batch()?).await?;
        }
        let Some(dataset) = example.data.first().map(|d| d.dataset_name.clone()) else {
            warn!("Example without data, skipping");
            continue;
        };

        for test in &example.tests {
            if !test.applies_to(connector.engine_name()) {
                warn!(title = %test.title, "Example not applicable to this engine, skipping");
                continue;
            }

            let config = test.configuration(kind, &dataset)?;
            let outcome = match validate(&config, &registry, connector, renderer, &runtime).await {
                Ok(result) => {
                    let verdict = Verdict {
                        success: result.success,
                        result: result.result,
                    };
                    let actual = serde_json::to_value(verdict)
                        .map_err(|e| ExpectraError::InternalError(e.to_string()))?;
                    ExampleOutcome {
                        title: test.title.clone(),
                        dataset: dataset.clone(),
                        passed: test.matches(&actual),
                        expected: test.output.clone(),
                        actual: Some(actual),
                        error: None,
                    }
                }
                Err(e) => ExampleOutcome {
                    title: test.title.clone(),
                    dataset: dataset.clone(),
                    passed: false,
                    expected: test.output.clone(),
                    actual: None,
                    error: Some(e.to_string()),
                },
            };
            outcomes.push(outcome);
        }
    }

    Ok(outcomes)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub message: String,
    pub passed: bool,
}

/// Readiness report for one expectation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticChecklist {
    pub expectation_type: String,
    pub items: Vec<ChecklistItem>,
}

impl DiagnosticChecklist {
    pub fn build(kind: ExpectationKind, outcomes: &[ExampleOutcome]) -> Self {
        let tests: Vec<_> = kind.examples().into_iter().flat_map(|e| e.tests).collect();
        let expects = |success: bool| {
            tests
                .iter()
                .any(|t| t.output.get("success") == Some(&Value::Bool(success)))
        };

        let item = |message: &str, passed: bool| ChecklistItem {
            message: message.to_string(),
            passed,
        };

        Self {
            expectation_type: kind.name().to_string(),
            items: vec![
                item("Has a docstring", !kind.description().trim().is_empty()),
                item("Has library metadata", kind.library_metadata().is_complete()),
                item(
                    "Has at least one positive and negative example",
                    expects(true) && expects(false),
                ),
                item(
                    "Core logic passes all examples",
                    !outcomes.is_empty() && outcomes.iter().all(|o| o.passed),
                ),
            ],
        }
    }

    pub fn passed(&self) -> bool {
        self.items.iter().all(|i| i.passed)
    }
}

impl fmt::Display for DiagnosticChecklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Completeness checklist for {}:", self.expectation_type)?;
        for item in &self.items {
            let mark = if item.passed { "✔" } else { " " };
            writeln!(f, " {} {}", mark, item.message)?;
        }
        Ok(())
    }
}
