//! Schema Registry
//!
//! Static description of the three metric tables. It is the single source for
//! the translation prompt context, the `/schema` listing and the bootstrap DDL,
//! so the three can never drift apart.

use itertools::Itertools;
use serde::Serialize;
use std::fmt;

/// Storage class of a column as declared in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SemanticType {
    Text,
    Integer,
    Real,
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Text => "TEXT",
            SemanticType::Integer => "INTEGER",
            SemanticType::Real => "REAL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub semantic_type: SemanticType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_statement(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {} {}", c.name, c.semantic_type))
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", self.name, columns)
    }
}

/// Ordered list of tables plus the query-writing conventions handed to the
/// translator as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub tables: Vec<TableSchema>,
    pub guidelines: Vec<&'static str>,
}

const GUIDELINES: &[&str] = &[
    "Use JOINs on `item_id` and `date` when combining tables.",
    "To calculate RoAS: SUM(ad_sales) / SUM(ad_spend)",
    "For latest eligibility: use MAX(eligibility_datetime_utc)",
    "Use SQLite syntax.",
    "Return only the SQL query (no explanation or markdown).",
];

fn column(name: &'static str, semantic_type: SemanticType) -> ColumnSchema {
    ColumnSchema { name, semantic_type }
}

impl SchemaDescriptor {
    /// Descriptor for the e-commerce advertising and sales store.
    pub fn describe() -> Self {
        use SemanticType::*;

        let tables = vec![
            TableSchema {
                name: "Product_Level_Ad_Sales_Metrics",
                columns: vec![
                    column("eligibility_datetime_utc", Text),
                    column("item_id", Integer),
                    column("eligibility", Integer),
                    column("message", Text),
                ],
            },
            TableSchema {
                name: "Product_Level_Total_Sales_Metrics",
                columns: vec![
                    column("date", Text),
                    column("item_id", Integer),
                    column("ad_sales", Real),
                    column("impressions", Integer),
                    column("ad_spend", Real),
                    column("clicks", Integer),
                    column("units_sold", Integer),
                ],
            },
            TableSchema {
                name: "Product_Eligibility",
                columns: vec![
                    column("date", Text),
                    column("item_id", Integer),
                    column("total_sales", Real),
                    column("total_units_ordered", Integer),
                ],
            },
        ];

        Self {
            tables,
            guidelines: GUIDELINES.to_vec(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Schema text embedded verbatim in the translation prompt.
    pub fn prompt_context(&self) -> String {
        let mut out = String::from("Database Schema:\n");

        for (idx, table) in self.tables.iter().enumerate() {
            out.push_str(&format!("\n{}. {}\n", idx + 1, table.name));
            for col in &table.columns {
                out.push_str(&format!("   - {} ({})\n", col.name, col.semantic_type));
            }
        }

        out.push_str("\nGuidelines:\n");
        for line in &self.guidelines {
            out.push_str(&format!("- {}\n", line));
        }

        out
    }

    /// Table listing served by `GET /schema`.
    pub fn tables_json(&self) -> serde_json::Value {
        let tables: Vec<serde_json::Value> = self
            .tables
            .iter()
            .map(|t| serde_json::json!({ "name": t.name, "columns": t.column_names() }))
            .collect();
        serde_json::json!({ "tables": tables })
    }

    pub fn create_statements(&self) -> Vec<String> {
        self.tables.iter().map(TableSchema::create_statement).collect()
    }
}
