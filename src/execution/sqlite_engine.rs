//! SQLite execution engine
//!
//! Opens a fresh connection per statement and closes it when done. The blocking
//! SQLite work runs on tokio's blocking pool so concurrent requests are not
//! stalled behind a slow query.

use crate::error::{AgentError, Result};
use crate::execution::engine::QueryExecutor;
use crate::execution::guard::{check_statement, ExecutionPolicy};
use crate::execution::result::{ResultSet, SqlValue};
use crate::schema::SchemaDescriptor;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, OpenFlags, Statement};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub struct SqliteEngine {
    db_path: PathBuf,
    policy: ExecutionPolicy,
}

impl SqliteEngine {
    pub fn new(db_path: impl AsRef<Path>, policy: ExecutionPolicy) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            policy,
        }
    }

    fn open(&self) -> Result<Connection> {
        let flags = if self.policy.is_read_only() {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI
        } else {
            OpenFlags::default()
        };

        Connection::open_with_flags(&self.db_path, flags).map_err(|e| {
            AgentError::Execution(format!(
                "Failed to open database {}: {}",
                self.db_path.display(),
                e
            ))
        })
    }

    /// Synchronous execution; callers on the async runtime go through `execute`.
    pub fn execute_blocking(&self, sql: &str) -> Result<ResultSet> {
        check_statement(sql, self.policy)?;

        let conn = self.open()?;
        let mut stmt = prepare_single(&conn, sql)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt
            .query([])
            .map_err(|e| AgentError::Execution(format!("Query failed: {}", e)))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| AgentError::Execution(format!("Failed to read row: {}", e)))?
        {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| AgentError::Execution(format!("Failed to read column {}: {}", idx, e)))?;
                values.push(to_sql_value(value));
            }
            out.push(values);
        }

        Ok(ResultSet::new(columns, out))
    }
}

/// Prepare `sql` as exactly one statement.
///
/// `Connection::prepare` compiles the first statement and ignores the rest, so
/// the text is walked as a batch and any second statement is an error.
fn prepare_single<'conn>(conn: &'conn Connection, sql: &str) -> Result<Statement<'conn>> {
    let prepare_err = |e: rusqlite::Error| AgentError::Execution(format!("Failed to prepare query: {}", e));

    let mut batch = Batch::new(conn, sql);
    let stmt = batch
        .next()
        .map_err(prepare_err)?
        .ok_or_else(|| AgentError::Execution("Expected exactly one SQL statement, got none".to_string()))?;

    if batch.next().map_err(prepare_err)?.is_some() {
        return Err(AgentError::Execution(
            "Expected exactly one SQL statement, got several".to_string(),
        ));
    }
    Ok(stmt)
}

fn to_sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Integer(v),
        ValueRef::Real(v) => SqlValue::Real(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[async_trait]
impl QueryExecutor for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn execute(&self, sql: &str) -> Result<ResultSet> {
        let engine = SqliteEngine::new(&self.db_path, self.policy);
        let sql_owned = sql.to_string();

        let result = tokio::task::spawn_blocking(move || engine.execute_blocking(&sql_owned))
            .await
            .map_err(|e| AgentError::Execution(format!("Query task failed: {}", e)))?;

        match &result {
            Ok(rows) => info!("Query returned {} row(s)", rows.len()),
            Err(e) => error!("Query failed: {}", e),
        }
        result
    }
}

/// Create the tables described by `schema` if they do not exist yet.
pub fn bootstrap_schema(db_path: impl AsRef<Path>, schema: &SchemaDescriptor) -> Result<()> {
    let conn = Connection::open(db_path.as_ref())
        .map_err(|e| AgentError::Execution(format!("Failed to open database: {}", e)))?;

    for ddl in schema.create_statements() {
        conn.execute(&ddl, [])
            .map_err(|e| AgentError::Execution(format!("Failed to create table: {}", e)))?;
    }

    info!(
        "Database schema initialized at {} ({} tables)",
        db_path.as_ref().display(),
        schema.tables.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::guard::GuardVerdict;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("ecommerce.db");
        bootstrap_schema(&path, &SchemaDescriptor::describe()).unwrap();

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO Product_Eligibility (date, item_id, total_sales, total_units_ordered) VALUES
                ('2025-06-01', 5, 120.5, 3),
                ('2025-06-02', 5, 80.0, 2),
                ('2025-06-01', 7, 40.0, 1);
            "#,
        )
        .unwrap();
        path
    }

    fn eligibility_rows(path: &Path) -> i64 {
        Connection::open(path)
            .unwrap()
            .query_row("SELECT COUNT(*) FROM Product_Eligibility", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn materializes_rows_in_column_order() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::ReadOnly);

        let rs = engine
            .execute_blocking("SELECT item_id, SUM(total_sales) AS total_sales FROM Product_Eligibility GROUP BY item_id ORDER BY item_id")
            .unwrap();

        assert_eq!(rs.columns, vec!["item_id", "total_sales"]);
        assert_eq!(rs.rows, vec![
            vec![SqlValue::Integer(5), SqlValue::Real(200.5)],
            vec![SqlValue::Integer(7), SqlValue::Real(40.0)],
        ]);
    }

    #[test]
    fn empty_result_keeps_columns() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::ReadOnly);

        let rs = engine
            .execute_blocking("SELECT date, item_id FROM Product_Eligibility WHERE item_id = 999")
            .unwrap();
        assert!(rs.is_empty());
        assert_eq!(rs.columns, vec!["date", "item_id"]);
    }

    #[test]
    fn missing_table_is_execution_error() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::ReadOnly);

        let err = engine.execute_blocking("SELECT * FROM Orders").unwrap_err();
        assert!(matches!(err, AgentError::Execution(msg) if msg.contains("no such table")));
    }

    #[test]
    fn missing_store_is_execution_error() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(dir.path().join("absent.db"), ExecutionPolicy::ReadOnly);
        assert!(matches!(
            engine.execute_blocking("SELECT 1"),
            Err(AgentError::Execution(_))
        ));
    }

    #[test]
    fn read_only_policy_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store(&dir);
        let engine = SqliteEngine::new(&path, ExecutionPolicy::ReadOnly);

        assert!(engine.execute_blocking("DELETE FROM Product_Eligibility").is_err());
        assert_eq!(eligibility_rows(&path), 3);
    }

    #[test]
    fn read_only_connection_stops_writes_the_parser_cannot_read() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store(&dir);
        let engine = SqliteEngine::new(&path, ExecutionPolicy::ReadOnly);
        let sql = "INSERT INTO Product_Eligibility DEFAULT VALUES";

        assert_eq!(check_statement(sql, ExecutionPolicy::ReadOnly).unwrap(), Some(GuardVerdict::Unparsed));
        let err = engine.execute_blocking(sql).unwrap_err();
        assert!(matches!(err, AgentError::Execution(msg) if msg.contains("readonly")));
        assert_eq!(eligibility_rows(&path), 3);
    }

    #[test]
    fn trailing_statement_is_rejected_under_permissive_policy() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store(&dir);
        let engine = SqliteEngine::new(&path, ExecutionPolicy::Permissive);

        let err = engine
            .execute_blocking("SELECT 1 AS a; DELETE FROM Product_Eligibility")
            .unwrap_err();
        assert!(matches!(err, AgentError::Execution(msg) if msg.contains("exactly one SQL statement")));
        assert_eq!(eligibility_rows(&path), 3);
    }

    #[test]
    fn trailing_unparsable_statement_is_rejected_under_read_only_policy() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::ReadOnly);
        let sql = "SELECT 1 AS a; SELEKT 2";

        assert_eq!(check_statement(sql, ExecutionPolicy::ReadOnly).unwrap(), Some(GuardVerdict::Unparsed));
        assert!(matches!(engine.execute_blocking(sql), Err(AgentError::Execution(_))));
    }

    #[test]
    fn trailing_semicolon_is_still_one_statement() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::Permissive);

        let rs = engine.execute_blocking("SELECT COUNT(*) AS n FROM Product_Eligibility;\n").unwrap();
        assert_eq!(rs.value(0, "n"), Some(&SqlValue::Integer(3)));
    }

    #[test]
    fn permissive_policy_executes_unmodified() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store(&dir);
        let engine = SqliteEngine::new(&path, ExecutionPolicy::Permissive);

        let rs = engine
            .execute_blocking("DELETE FROM Product_Eligibility WHERE item_id = 7")
            .unwrap();
        assert!(rs.is_empty());

        let rs = engine.execute_blocking("SELECT COUNT(*) AS n FROM Product_Eligibility").unwrap();
        assert_eq!(rs.value(0, "n"), Some(&SqlValue::Integer(2)));
    }

    #[tokio::test]
    async fn repeated_execution_is_identical() {
        let dir = TempDir::new().unwrap();
        let engine = SqliteEngine::new(seeded_store(&dir), ExecutionPolicy::ReadOnly);
        let sql = "SELECT date, item_id, total_sales FROM Product_Eligibility ORDER BY date, item_id";

        let first = engine.execute(sql).await.unwrap();
        let second = engine.execute(sql).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(engine.name(), "sqlite");
    }
}
