//! Query Translator
//!
//! Turns a natural-language question into a single SQL statement by prompting
//! a `TextGenerator` with the schema context, then stripping any markdown
//! fencing from the reply. The returned SQL is not parsed here.

use crate::error::{AgentError, Result};
use crate::llm::TextGenerator;
use crate::schema::SchemaDescriptor;
use std::sync::Arc;
use tracing::{error, info};

const FENCE: &str = "```";
const SQL_FENCE: &str = "```sql";

pub struct QueryTranslator {
    generator: Arc<dyn TextGenerator>,
}

impl QueryTranslator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Translate `question` into one SQL statement for `schema`.
    ///
    /// One outbound call, no retries.
    pub async fn translate(&self, question: &str, schema: &SchemaDescriptor) -> Result<String> {
        let prompt = build_prompt(question, schema);

        let raw = self.generator.generate(&prompt).await.map_err(|e| {
            error!("LLM error ({}): {}", self.generator.label(), e);
            match e {
                AgentError::Translation(_) => e,
                other => AgentError::Translation(other.to_string()),
            }
        })?;

        let sql = strip_sql_fences(&raw);
        if sql.is_empty() {
            return Err(AgentError::Translation(
                "Model response did not contain a SQL statement".to_string(),
            ));
        }

        info!("Translated with {}", self.generator.label());
        Ok(sql)
    }
}

/// Prompt with the schema context verbatim, followed by the question.
pub fn build_prompt(question: &str, schema: &SchemaDescriptor) -> String {
    format!(
        "{}\n\
         Convert the following natural language question into a single SQLite query.\n\
         Return only the SQL statement: no prose, no markdown, no code fences.\n\
         \"{}\"\n",
        schema.prompt_context(),
        question
    )
}

/// Trim, drop a leading "```sql" (or bare "```") and a trailing "```", trim again.
///
/// If a closing fence is still present after that, whatever follows it is
/// commentary and is cut off.
pub fn strip_sql_fences(raw: &str) -> String {
    let mut sql = raw.trim();

    if let Some(rest) = sql.strip_prefix(SQL_FENCE).or_else(|| sql.strip_prefix("```SQL")) {
        sql = rest;
    } else if let Some(rest) = sql.strip_prefix(FENCE) {
        sql = rest;
    }
    if let Some(rest) = sql.strip_suffix(FENCE) {
        sql = rest;
    }

    if let Some(idx) = sql.find(FENCE) {
        sql = &sql[..idx];
    }

    sql.trim().to_string()
}
