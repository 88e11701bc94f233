// expectra-core/src/application/ports/renderer.rs

use crate::error::ExpectraError;

/// Substitutes bound values into a query template.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, ExpectraError>;
}
