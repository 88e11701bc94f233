// expectra-core/src/domain/compiler/query.rs

// Everything interpolated into a query template goes through this module first.
// Column and table names must be plain identifiers and are always double-quoted.
// Filter expressions are parsed with sqlparser and re-emitted from the AST,
// so the engine never sees user text that did not round-trip through the parser.

use regex::Regex;
use serde_json::json;
use sqlparser::ast::{SetExpr, Statement};
use sqlparser::dialect::GenericDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::domain::error::DomainError;

pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Placeholders every query template must reference.
pub const PLACEHOLDERS: [&str; 3] = ["column_A", "column_B", "active_batch"];

fn re_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap_or_else(|_| {
            // Hardcoded pattern, cannot fail.
            Regex::new("$^").unwrap_or_else(|_| unreachable!())
        })
    })
}

fn re_jinja_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

fn re_single_brace_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{(column_A|column_B|active_batch)\}")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

pub fn is_identifier(name: &str) -> bool {
    name.len() <= MAX_IDENTIFIER_LEN && re_identifier().is_match(name)
}

/// `key` names the configuration entry the identifier came from, for error reporting.
pub fn validate_identifier(key: &str, name: &str) -> Result<(), DomainError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DomainError::InvalidIdentifier {
            key: key.to_string(),
            name: name.to_string(),
        })
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Parses a single SQL expression and returns its canonical form.
///
/// Rejects statement separators, nested `SELECT`s and trailing input.
pub fn parse_expression(key: &str, raw: &str) -> Result<String, DomainError> {
    let invalid = |reason: String| DomainError::InvalidExpression {
        key: key.to_string(),
        reason,
    };

    let dialect = GenericDialect {};
    let tokens = Tokenizer::new(&dialect, raw)
        .tokenize()
        .map_err(|e| invalid(e.to_string()))?;

    for token in &tokens {
        match token {
            Token::SemiColon => return Err(invalid("statement separator ';'".into())),
            Token::Word(word) if word.keyword == Keyword::SELECT => {
                return Err(invalid("subqueries are not allowed".into()));
            }
            _ => {}
        }
    }

    let mut parser = Parser::new(&dialect)
        .try_with_sql(raw)
        .map_err(|e| invalid(e.to_string()))?;
    let expr = parser.parse_expr().map_err(|e| invalid(e.to_string()))?;

    let next = parser.peek_token();
    if next.token != Token::EOF {
        return Err(invalid(format!("unexpected trailing input at '{}'", next.token)));
    }

    Ok(expr.to_string())
}

/// The `column_B` filter: a boolean column or a boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    Column(String),
    Expression(String),
}

impl FilterExpression {
    pub fn parse(key: &str, raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if is_identifier(trimmed) {
            return Ok(Self::Column(trimmed.to_string()));
        }
        parse_expression(key, trimmed).map(Self::Expression)
    }

    pub fn render(&self) -> String {
        match self {
            Self::Column(name) => quote_identifier(name),
            Self::Expression(expr) => expr.clone(),
        }
    }

    /// Column name when the filter is a bare column.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Column(name) => Some(name),
            Self::Expression(_) => None,
        }
    }
}

/// The data slice a query reads from: a table, optionally pre-filtered by a row condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveBatch<'a> {
    pub table: &'a str,
    pub row_condition: Option<&'a str>,
}

impl ActiveBatch<'_> {
    pub fn render(&self) -> String {
        match self.row_condition {
            None => quote_identifier(self.table),
            Some(condition) => format!(
                "(SELECT * FROM {} WHERE {}) AS active_batch",
                quote_identifier(self.table),
                condition
            ),
        }
    }
}

/// A query template in minijinja syntax (`{{ column_A }}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate(String);

impl QueryTemplate {
    /// Accepts `{{ name }}` or `{name}` placeholders; the latter are rewritten.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = if raw.contains("{{") {
            raw.to_string()
        } else {
            re_single_brace_placeholder()
                .replace_all(raw, "{{ $1 }}")
                .into_owned()
        };

        let referenced: BTreeSet<&str> = re_jinja_placeholder()
            .captures_iter(&normalized)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        if let Some(unknown) = referenced.iter().find(|n| !PLACEHOLDERS.contains(n)) {
            return Err(DomainError::InvalidQuery(format!(
                "unknown placeholder '{}' in query template",
                unknown
            )));
        }
        if let Some(missing) = PLACEHOLDERS.iter().find(|n| !referenced.contains(*n)) {
            return Err(DomainError::InvalidQuery(format!(
                "query template does not reference '{}'",
                missing
            )));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything needed to render the query of a query-based expectation.
#[derive(Debug, Clone, Copy)]
pub struct QuerySpec<'a> {
    pub template: &'a QueryTemplate,
    pub column: &'a str,
    pub filter: &'a FilterExpression,
    pub batch_id: Option<&'a str>,
    pub row_condition: Option<&'a str>,
}

impl QuerySpec<'_> {
    /// Template context, every value already quoted or canonicalized.
    pub fn bindings(&self, table: &str) -> serde_json::Value {
        let active_batch = ActiveBatch {
            table,
            row_condition: self.row_condition,
        };
        json!({
            "column_A": quote_identifier(self.column),
            "column_B": self.filter.render(),
            "active_batch": active_batch.render(),
        })
    }
}

/// The rendered query must be exactly one `SELECT`. Returns it on a single line.
pub fn ensure_single_select(sql: &str) -> Result<String, DomainError> {
    let dialect = GenericDialect {};
    let statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| DomainError::InvalidQuery(e.to_string()))?;

    match statements.as_slice() {
        [Statement::Query(query)] if matches!(query.body.as_ref(), SetExpr::Select(_)) => {
            let canonical = statements[0].to_string();
            tracing::debug!("Canonical query: {}", canonical);
            Ok(canonical)
        }
        [_] => Err(DomainError::InvalidQuery(
            "query is not a SELECT statement".into(),
        )),
        _ => Err(DomainError::InvalidQuery(format!(
            "expected exactly one statement, found {}",
            statements.len()
        ))),
    }
}
