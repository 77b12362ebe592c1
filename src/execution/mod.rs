//! Execution Module - runs translated SQL against the relational store
//!
//! - `QueryExecutor` trait for pluggable stores
//! - `ResultSet` for materialized rows
//! - statement guard enforcing the execution policy
//! - SQLite implementation

pub mod engine;
pub mod guard;
pub mod result;
pub mod sqlite_engine;

pub use engine::QueryExecutor;
pub use guard::{check_statement, ExecutionPolicy, GuardVerdict};
pub use result::{ResultSet, SqlValue};
pub use sqlite_engine::{bootstrap_schema, SqliteEngine};
