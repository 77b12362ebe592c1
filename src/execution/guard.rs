//! Statement guard for translated SQL.
//!
//! Under `ExecutionPolicy::ReadOnly` a statement must parse as exactly one
//! query. Text the parser does not understand is passed on to the store, which
//! is then opened read-only.

use crate::error::{AgentError, Result};
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Only single read-only queries, on a read-only connection.
    #[default]
    ReadOnly,
    /// Execute whatever the translator produced, unmodified.
    Permissive,
}

impl ExecutionPolicy {
    pub fn is_read_only(&self) -> bool {
        matches!(self, ExecutionPolicy::ReadOnly)
    }
}

/// Outcome of inspecting a statement under the read-only policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Parsed as a single query.
    Query,
    /// Not understood by the parser; left to the store to reject.
    Unparsed,
}

pub fn check_statement(sql: &str, policy: ExecutionPolicy) -> Result<Option<GuardVerdict>> {
    if !policy.is_read_only() {
        return Ok(None);
    }

    let statements = match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) => statements,
        Err(e) => {
            warn!("SQL parsing failed: {}, deferring to read-only connection", e);
            return Ok(Some(GuardVerdict::Unparsed));
        }
    };

    match statements.as_slice() {
        [] => Err(AgentError::Execution("Empty SQL statement".to_string())),
        [Statement::Query(_)] => {
            debug!("Statement accepted as read-only query");
            Ok(Some(GuardVerdict::Query))
        }
        [other] => Err(AgentError::Execution(format!(
            "Only read-only queries are allowed, got: {}",
            statement_kind(other)
        ))),
        many => Err(AgentError::Execution(format!(
            "Expected exactly one SQL statement, got {}",
            many.len()
        ))),
    }
}

/// Leading keyword of the statement as rendered by the parser (e.g. "DROP").
fn statement_kind(statement: &Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .next()
        .map(|w| w.to_ascii_uppercase())
        .unwrap_or_else(|| "unknown".to_string())
}
