//! Wide-to-long reshaping of ledger rows.

use crate::dataset::{LedgerTable, Value};
use crate::error::{DashboardError, Result};
use log::debug;
use serde::{Deserialize, Serialize};

/// One (other-dimensions, month, value) triple produced by [`unpivot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    /// Kept columns, in the order they were requested.
    pub dimensions: Vec<(String, Value)>,
    /// Name of the value column this row came from.
    pub month: String,
    pub value: f64,
    /// Index of the wide row this was emitted from.
    pub source_row: usize,
}

impl LongRow {
    pub fn dimension(&self, column: &str) -> Option<&Value> {
        self.dimensions
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn require_dimension(&self, column: &str) -> Result<&Value> {
        self.dimension(column)
            .ok_or_else(|| DashboardError::schema(column))
    }
}

/// Converts wide rows into long rows.
///
/// Emits `table.len() * value_columns.len()` rows, input-row-major and then in the
/// order of `value_columns`. Every value cell must be numeric.
pub fn unpivot(
    table: &LedgerTable,
    value_columns: &[&str],
    other_columns: &[&str],
) -> Result<Vec<LongRow>> {
    unpivot_with(table, value_columns, other_columns, |v| v)
}

/// [`unpivot`] with `transform` applied to each value before it is emitted.
pub fn unpivot_with<F>(
    table: &LedgerTable,
    value_columns: &[&str],
    other_columns: &[&str],
    transform: F,
) -> Result<Vec<LongRow>>
where
    F: Fn(f64) -> f64,
{
    let value_idx = table.require_columns(value_columns)?;
    let other_idx = table.require_columns(other_columns)?;

    let mut long = Vec::with_capacity(table.len() * value_columns.len());
    for row in table.rows() {
        let dimensions: Vec<(String, Value)> = other_columns
            .iter()
            .zip(&other_idx)
            .map(|(name, &idx)| (name.to_string(), row.at(idx).clone()))
            .collect();

        for (name, &idx) in value_columns.iter().zip(&value_idx) {
            long.push(LongRow {
                dimensions: dimensions.clone(),
                month: name.to_string(),
                value: transform(row.number_at(idx)?),
                source_row: row.index(),
            });
        }
    }

    debug!(
        "Unpivoted {} wide rows over {} value columns into {} long rows",
        table.len(),
        value_columns.len(),
        long.len()
    );

    Ok(long)
}
