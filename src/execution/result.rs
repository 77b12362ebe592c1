//! Result Set - rows materialized from one executed statement
//!
//! Column order is whatever the statement produced and is preserved when the
//! rows are serialized as JSON objects.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Scalar value read from the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, SqlValue::Integer(_) | SqlValue::Real(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value at (`row`, `column`), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// True when the column has at least one non-null value and every
    /// non-null value is an integer or real.
    pub fn is_numeric_column(&self, idx: usize) -> bool {
        let mut seen_value = false;
        for row in &self.rows {
            match row.get(idx) {
                Some(v) if v.is_null() => {}
                Some(v) if v.is_numeric() => seen_value = true,
                _ => return false,
            }
        }
        seen_value
    }

    /// First numeric column in declaration order.
    pub fn first_numeric_column(&self) -> Option<&str> {
        (0..self.columns.len())
            .find(|&idx| self.is_numeric_column(idx))
            .map(|idx| self.columns[idx].as_str())
    }
}

struct RowRef<'a> {
    columns: &'a [String],
    values: &'a [SqlValue],
}

impl Serialize for RowRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Serialized as an array of `{column: value}` objects.
impl Serialize for ResultSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in &self.rows {
            seq.serialize_element(&RowRef { columns: &self.columns, values })?;
        }
        seq.end()
    }
}
