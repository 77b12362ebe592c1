//! Pipeline Orchestrator
//!
//! question -> translator (+ schema) -> SQL -> executor -> rows -> chart selector
//!
//! Translation and execution failures are caught here, once, and turned into a
//! failure `AskResponse`. Only an empty question is returned as an error.

use crate::error::{AgentError, Result};
use crate::execution::{QueryExecutor, ResultSet};
use crate::llm::TextGenerator;
use crate::schema::SchemaDescriptor;
use crate::translator::QueryTranslator;
use crate::visualization::{Chart, ChartSelector};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const FAILURE_ANSWER: &str = "Error occurred.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub sql_query: Option<String>,
    pub data: Option<ResultSet>,
    pub visualization: Option<Chart>,
    pub error: Option<String>,
}

impl AskResponse {
    fn success(sql: String, rows: ResultSet, chart: Option<Chart>) -> Self {
        Self {
            answer: summarize(&rows),
            sql_query: Some(sql),
            data: Some(rows),
            visualization: chart,
            error: None,
        }
    }

    fn failure(err: &AgentError) -> Self {
        Self {
            answer: FAILURE_ANSWER.to_string(),
            sql_query: None,
            data: None,
            visualization: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn summarize(rows: &ResultSet) -> String {
    if rows.is_empty() {
        "No results found.".to_string()
    } else {
        format!("Found {} result(s).", rows.len())
    }
}

/// Built once at start-up and shared by every request.
pub struct QueryPipeline {
    schema: Arc<SchemaDescriptor>,
    translator: QueryTranslator,
    executor: Arc<dyn QueryExecutor>,
    charts: ChartSelector,
}

impl QueryPipeline {
    pub fn new(
        schema: SchemaDescriptor,
        generator: Arc<dyn TextGenerator>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            translator: QueryTranslator::new(generator),
            executor,
            charts: ChartSelector::new(),
        }
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Answer one question.
    ///
    /// Returns `AgentError::ClientInput` for an empty or whitespace-only
    /// question without calling the translator. Every other failure is encoded
    /// in the returned response.
    pub async fn answer(&self, question: &str) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AgentError::ClientInput("Question is empty".to_string()));
        }

        let span = info_span!("ask", request_id = %Uuid::new_v4());
        let response = async {
            info!("Question: {}", question);
            match self.run(question).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    AskResponse::failure(&e)
                }
            }
        }
        .instrument(span)
        .await;

        Ok(response)
    }

    async fn run(&self, question: &str) -> Result<AskResponse> {
        let sql = self.translator.translate(question, &self.schema).await?;
        info!("SQL ({}): {}", self.executor.name(), sql);

        let rows = self.executor.execute(&sql).await?;
        let chart = self.charts.select(&rows, question);
        info!(
            "Answered with {} row(s), chart: {}",
            rows.len(),
            chart.as_ref().map(|c| c.title.as_str()).unwrap_or("none")
        );

        Ok(AskResponse::success(sql, rows, chart))
    }
}
