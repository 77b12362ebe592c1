//! Natural-language query interface over the e-commerce advertising and sales
//! metrics store.
//!
//! A question is translated to SQL by an external language model, executed
//! against the local SQLite store, and returned with an optional chart.

pub mod config;
pub mod error;
pub mod execution;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod translator;
pub mod visualization;

pub use config::AppConfig;
pub use error::{AgentError, Result};
pub use execution::{ExecutionPolicy, QueryExecutor, ResultSet, SqlValue, SqliteEngine};
pub use llm::{GeminiClient, TextGenerator};
pub use pipeline::{AskResponse, QueryPipeline};
pub use schema::SchemaDescriptor;
pub use translator::QueryTranslator;
pub use visualization::{Chart, ChartSelector, ChartType};

use std::sync::Arc;

/// Wire the default pipeline (Gemini + SQLite) from configuration.
pub fn build_pipeline(config: &AppConfig) -> Result<QueryPipeline> {
    let generator = Arc::new(GeminiClient::from_config(&config.llm)?);
    let executor = Arc::new(SqliteEngine::new(&config.db_path, config.policy));
    Ok(QueryPipeline::new(SchemaDescriptor::describe(), generator, executor))
}
