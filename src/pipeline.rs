//! Composable pipeline steps shared by the dashboard queries.

use crate::dataset::{LedgerTable, RowRef};
use crate::error::Result;
use log::debug;
use std::collections::BTreeMap;

/// Row predicate over ledger dimension columns.
///
/// A blank cell satisfies no comparison, so it fails `Eq`, `NotEq` and `NumEq` alike.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: String, literal: String },
    NotEq { column: String, literal: String },
    /// Numeric equality, so `2023`, `2023.0` and `"2023"` all match the year 2023.
    NumEq { column: String, value: f64 },
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &str, literal: impl ToString) -> Self {
        Predicate::Eq {
            column: column.to_string(),
            literal: literal.to_string(),
        }
    }

    pub fn not_eq(column: &str, literal: impl ToString) -> Self {
        Predicate::NotEq {
            column: column.to_string(),
            literal: literal.to_string(),
        }
    }

    pub fn num_eq(column: &str, value: impl Into<f64>) -> Self {
        Predicate::NumEq {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::And(mut parts) => {
                parts.push(other);
                Predicate::And(parts)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// Every column the predicate reads.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Predicate::Eq { column, .. }
            | Predicate::NotEq { column, .. }
            | Predicate::NumEq { column, .. } => vec![column.as_str()],
            Predicate::And(parts) => parts.iter().flat_map(Predicate::columns).collect(),
        }
    }

    fn evaluate(&self, row: RowRef<'_>, table: &LedgerTable) -> bool {
        let cell = |column: &str| {
            table
                .column_index(column)
                .map(|idx| row.at(idx))
                .filter(|value| !value.is_empty())
        };
        match self {
            Predicate::Eq { column, literal } => {
                cell(column).is_some_and(|value| value.matches(literal))
            }
            Predicate::NotEq { column, literal } => {
                cell(column).is_some_and(|value| !value.matches(literal))
            }
            Predicate::NumEq { column, value } => cell(column)
                .and_then(|v| v.as_number())
                .is_some_and(|n| n == *value),
            Predicate::And(parts) => parts.iter().all(|p| p.evaluate(row, table)),
        }
    }
}

/// Keeps the rows matching `predicate`. Fails if the predicate names an absent column.
pub fn filter(table: &LedgerTable, predicate: &Predicate) -> Result<LedgerTable> {
    table.require_columns(&predicate.columns())?;
    let filtered = table.select_rows(|row| predicate.evaluate(row, table));
    debug!(
        "Filter {:?} kept {} of {} rows",
        predicate,
        filtered.len(),
        table.len()
    );
    Ok(filtered)
}

/// Sums `value` per key.
///
/// This is also the sort step of every query: groups come back in ascending key
/// order, so callers pick their ordering through the key tuple.
pub fn group_sum<T, K, FK, FV>(items: &[T], key: FK, value: FV) -> Result<BTreeMap<K, f64>>
where
    K: Ord,
    FK: Fn(&T) -> Result<K>,
    FV: Fn(&T) -> Result<f64>,
{
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for item in items {
        *groups.entry(key(item)?).or_insert(0.0) += value(item)?;
    }
    Ok(groups)
}

/// Counts the items falling into each key.
pub fn group_count<T, K, FK>(items: &[T], key: FK) -> Result<BTreeMap<K, usize>>
where
    K: Ord,
    FK: Fn(&T) -> Result<K>,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)?).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Sum of the named numeric columns for one row.
pub fn row_total(row: RowRef<'_>, indices: &[usize]) -> Result<f64> {
    indices.iter().map(|&idx| row.number_at(idx)).sum()
}
