// expectra-core/src/infrastructure/compiler/jinja.rs

// Renders query templates ({{ column_A }}, {{ column_B }}, {{ active_batch }}) into SQL.
// Values are bound already quoted by the domain compiler; the renderer only substitutes.

use crate::application::ports::TemplateEngine;
use crate::error::ExpectraError;
use crate::infrastructure::error::InfrastructureError;
use minijinja::{Environment, UndefinedBehavior};

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // A typo in a template placeholder must fail loudly, not render as "".
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, ExpectraError> {
        self.env
            .render_str(template, context)
            .map_err(|e| ExpectraError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
