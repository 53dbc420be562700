//! The in-memory wide ledger table and its column contract.

use crate::error::{DashboardError, Result};
use crate::schema::{month_columns, DIMENSION_COLUMNS};
use crate::utils::{canonical_number, parse_amount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single ledger cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Empty,
}

impl Value {
    /// Interprets raw spreadsheet text: numbers become `Number`, blanks become `Empty`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        match parse_amount(trimmed) {
            Some(number) => Value::Number(number),
            None => Value::Text(trimmed.to_string()),
        }
    }

    /// Keeps raw spreadsheet text as-is, so `"01"` and `"1"` stay distinct labels.
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Empty
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => parse_amount(s),
            Value::Empty => None,
        }
    }

    /// Integral year, whether stored as text or number.
    pub fn as_year(&self) -> Option<i32> {
        self.as_number()
            .filter(|n| n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64)
            .map(|n| n as i32)
    }

    /// Text used for equality against dimension literals.
    pub fn key(&self) -> String {
        match self {
            Value::Number(n) => canonical_number(*n),
            Value::Text(s) => s.trim().to_string(),
            Value::Empty => String::new(),
        }
    }

    pub fn matches(&self, literal: &str) -> bool {
        self.key() == literal.trim()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

/// Wide-format ledger: ordered rows, each holding one value per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of one ledger row.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    table: &'a LedgerTable,
    index: usize,
}

impl LedgerTable {
    /// Builds a table, padding short rows with `Empty` and truncating long ones.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
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

    /// Resolves column names to indices, failing on the first one that is absent.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| {
                self.column_index(name)
                    .ok_or_else(|| DashboardError::schema(*name))
            })
            .collect()
    }

    /// Checks the four dimension columns and the twelve month columns.
    pub fn validate_ledger_schema(&self) -> Result<()> {
        self.require_columns(&DIMENSION_COLUMNS)?;
        self.require_columns(&month_columns())?;
        Ok(())
    }

    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(DashboardError::EmptyDataset);
        }
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'_>> {
        (0..self.rows.len()).map(move |index| RowRef { table: self, index })
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows.len()).then_some(RowRef { table: self, index })
    }

    /// New table with the same columns holding only the rows `keep` accepts.
    pub fn select_rows<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let rows = self
            .rows()
            .filter(|row| keep(*row))
            .map(|row| self.rows[row.index].clone())
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Header plus the first `limit` rows, rendered as text.
    pub fn preview(&self, limit: usize) -> DataPreview {
        DataPreview {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .take(limit)
                .map(|row| row.iter().map(Value::key).collect())
                .collect(),
            total_rows: self.rows.len(),
        }
    }
}

impl<'a> RowRef<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Result<&'a Value> {
        let idx = self
            .table
            .column_index(column)
            .ok_or_else(|| DashboardError::schema(column))?;
        Ok(self.at(idx))
    }

    pub fn at(&self, idx: usize) -> &'a Value {
        &self.table.rows[self.index][idx]
    }

    /// Numeric value of a cell; blanks and text are reported as invalid.
    pub fn number_at(&self, idx: usize) -> Result<f64> {
        let value = self.at(idx);
        value
            .as_number()
            .ok_or_else(|| DashboardError::InvalidValue {
                column: self.table.columns[idx].clone(),
                row: self.index,
                value: value.key(),
            })
    }
}

/// Textual preview of the uploaded ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DataPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}
