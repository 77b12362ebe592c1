//! Query Executor trait - contract between the pipeline and the store
//!
//! The executor runs exactly the statement it is handed (no rewriting, no
//! injected LIMIT) and materializes every row.

use crate::error::Result;
use crate::execution::result::ResultSet;
use async_trait::async_trait;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Engine name (e.g. "sqlite")
    fn name(&self) -> &'static str;

    /// Execute one SQL statement and return all of its rows.
    async fn execute(&self, sql: &str) -> Result<ResultSet>;
}
