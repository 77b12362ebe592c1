#![allow(dead_code)]

use async_trait::async_trait;
use ecom_data_agent::execution::bootstrap_schema;
use ecom_data_agent::{AgentError, Result, SchemaDescriptor, TextGenerator};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// Generator that replies with a fixed text and records every prompt.
pub struct ScriptedGenerator {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn label(&self) -> String {
        "scripted".to_string()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.reply.is_empty() {
            return Err(AgentError::Translation("service unavailable".to_string()));
        }
        Ok(self.reply.clone())
    }
}

/// Store with the three metric tables and a handful of rows.
pub fn seeded_store(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("ecommerce.db");
    bootstrap_schema(&path, &SchemaDescriptor::describe()).unwrap();

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO Product_Level_Total_Sales_Metrics
            (date, item_id, ad_sales, impressions, ad_spend, clicks, units_sold) VALUES
            ('2025-06-01', 5, 100.0, 1000, 20.0, 40, 4),
            ('2025-06-02', 5, 150.0, 1200, 30.0, 55, 6),
            ('2025-06-01', 7, 60.0, 800, 25.0, 20, 2),
            ('2025-06-02', 7, 40.0, 500, 10.0, 12, 1);

        INSERT INTO Product_Eligibility (date, item_id, total_sales, total_units_ordered) VALUES
            ('2025-06-01', 5, 300.0, 10),
            ('2025-06-01', 7, 90.0, 3);

        INSERT INTO Product_Level_Ad_Sales_Metrics
            (eligibility_datetime_utc, item_id, eligibility, message) VALUES
            ('2025-06-01T08:00:00Z', 5, 1, NULL),
            ('2025-06-02T08:00:00Z', 7, 0, 'Out of stock');
        "#,
    )
    .unwrap();
    path
}
