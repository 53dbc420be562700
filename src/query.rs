use crate::dataset::{LedgerTable, RowRef};
use crate::error::{DashboardError, Result};
use crate::pipeline::{filter, group_count, group_sum, row_total, Predicate};
use crate::reshape::{unpivot, unpivot_with, LongRow};
use crate::schema::*;
use crate::utils::magnitude;
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rows produced by one dashboard query, with the caption shown above its chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryResult<R> {
    pub title: String,
    pub rows: Vec<R>,
}

impl<R> QueryResult<R> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupedSalesRow {
    pub business_unit: String,
    #[serde(rename = "Scenario")]
    pub scenario: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySalesRow {
    #[serde(rename = "Scenario")]
    pub scenario: String,
    pub month: Month,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AccountTotalRow {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Year")]
    pub year: i32,
    pub amount: f64,
}

fn sales_in_year(year: i32) -> Predicate {
    Predicate::num_eq(YEAR, year).and(Predicate::eq(ACCOUNT, SALES_ACCOUNT))
}

fn text_dimension(row: &LongRow, column: &str) -> Result<String> {
    Ok(row.require_dimension(column)?.key())
}

/// Sales per (business unit, scenario) for `year`, summed over all twelve months.
///
/// Groups are ordered by business unit, then scenario.
pub fn grouped_sales(table: &LedgerTable, year: i32) -> Result<QueryResult<GroupedSalesRow>> {
    table.ensure_not_empty()?;
    let months = month_columns();
    let month_idx = table.require_columns(&months)?;
    let dims = table.require_columns(&[BUSINESS_UNIT, SCENARIO])?;

    let matching = filter(table, &sales_in_year(year))?;
    let rows: Vec<RowRef<'_>> = matching.rows().collect();

    let totals = group_sum(
        &rows,
        |row| Ok((row.at(dims[0]).key(), row.at(dims[1]).key())),
        |row| row_total(*row, &month_idx),
    )?;

    let rows: Vec<GroupedSalesRow> = totals
        .into_iter()
        .map(|((business_unit, scenario), sales)| GroupedSalesRow {
            business_unit,
            scenario,
            sales,
        })
        .collect();

    debug!("Grouped sales for {} produced {} groups", year, rows.len());

    Ok(QueryResult {
        title: format!("Sales for Year {}", year),
        rows,
    })
}

/// Monthly sales per scenario for one business unit in `year`.
///
/// Rows are ordered Jan→Dec, scenarios alphabetically within a month. Several ledger
/// rows for the same scenario are summed month by month.
pub fn monthly_series(
    table: &LedgerTable,
    year: i32,
    business_unit: &str,
) -> Result<QueryResult<MonthlySalesRow>> {
    table.ensure_not_empty()?;
    let months = month_columns();
    table.require_columns(&[SCENARIO])?;

    let predicate = sales_in_year(year).and(Predicate::eq(BUSINESS_UNIT, business_unit));
    let matching = filter(table, &predicate)?;

    let wide: Vec<RowRef<'_>> = matching.rows().collect();
    let per_scenario = group_count(&wide, |row| Ok(row.get(SCENARIO)?.key()))?;
    for (scenario, count) in per_scenario.iter().filter(|&(_, &count)| count > 1) {
        warn!(
            "{} ledger rows match {} / {} / {}; summing them",
            count, year, business_unit, scenario
        );
    }

    let long = unpivot(&matching, &months, &[SCENARIO])?;
    let sums = group_sum(
        &long,
        |row| {
            let month =
                Month::from_column(&row.month).ok_or_else(|| DashboardError::schema(&row.month))?;
            Ok((month, text_dimension(row, SCENARIO)?))
        },
        |row| Ok(row.value),
    )?;

    let rows = sums
        .into_iter()
        .map(|((month, scenario), sales)| MonthlySalesRow {
            scenario,
            month,
            sales,
        })
        .collect();

    Ok(QueryResult {
        title: format!("Monthly Budget vs Forecast {}", year),
        rows,
    })
}

/// Absolute non-sales amounts per (account, year) across every year of actuals.
///
/// Rows whose Year is not a whole number are left out with a warning.
pub fn yearly_account_totals(table: &LedgerTable) -> Result<QueryResult<AccountTotalRow>> {
    table.ensure_not_empty()?;
    let months = month_columns();

    let predicate = Predicate::eq(SCENARIO, ACTUALS_SCENARIO)
        .and(Predicate::not_eq(ACCOUNT, SALES_ACCOUNT));
    let actuals = filter(table, &predicate)?;

    let year_idx = actuals.require_columns(&[YEAR])?[0];
    let dated = actuals.select_rows(|row| {
        let value = row.at(year_idx);
        let usable = value.as_year().is_some();
        if !usable {
            warn!("Skipping actuals row with {} '{}'", YEAR, value);
        }
        usable
    });

    let long = unpivot_with(&dated, &months, &[ACCOUNT, YEAR], magnitude)?;
    let totals = group_sum(
        &long,
        |row| {
            let year_value = row.require_dimension(YEAR)?;
            let year = year_value
                .as_year()
                .ok_or_else(|| DashboardError::InvalidValue {
                    column: YEAR.to_string(),
                    row: row.source_row,
                    value: year_value.key(),
                })?;
            Ok((text_dimension(row, ACCOUNT)?, year))
        },
        |row| Ok(row.value),
    )?;

    let rows: Vec<AccountTotalRow> = totals
        .into_iter()
        .map(|((account, year), amount)| AccountTotalRow {
            account,
            year,
            amount,
        })
        .collect();

    debug!("Yearly account totals produced {} rows", rows.len());

    Ok(QueryResult {
        title: "Actual Yearly Sales Per Account".to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;

    fn ledger(rows: Vec<(i32, &str, &str, &str, [f64; 12])>) -> LedgerTable {
        let mut columns: Vec<String> = DIMENSION_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(month_columns().iter().map(|m| m.to_string()));

        let rows = rows
            .into_iter()
            .map(|(year, scenario, account, unit, months)| {
                let mut row: Vec<Value> =
                    vec![year.into(), scenario.into(), account.into(), unit.into()];
                row.extend(months.iter().map(|&v| Value::Number(v)));
                row
            })
            .collect();
        LedgerTable::new(columns, rows)
    }

    fn months(jan: f64, feb: f64) -> [f64; 12] {
        let mut m = [0.0; 12];
        m[0] = jan;
        m[1] = feb;
        m
    }

    #[test]
    fn test_grouped_sales_sums_months_per_group() {
        let table = ledger(vec![
            (2023, "Actuals", "Sales", "Software", months(100.0, 200.0)),
            (2023, "Budget", "Sales", "Software", months(90.0, 210.0)),
            (2023, "Actuals", "Sales", "Software", months(1.0, 2.0)),
            (2023, "Actuals", "Rent", "Software", months(5.0, 5.0)),
            (2022, "Actuals", "Sales", "Software", months(7.0, 7.0)),
        ]);

        let result = grouped_sales(&table, 2023).unwrap();
        assert_eq!(result.title, "Sales for Year 2023");
        assert_eq!(
            result.rows,
            vec![
                GroupedSalesRow {
                    business_unit: "Software".to_string(),
                    scenario: "Actuals".to_string(),
                    sales: 303.0,
                },
                GroupedSalesRow {
                    business_unit: "Software".to_string(),
                    scenario: "Budget".to_string(),
                    sales: 300.0,
                },
            ]
        );
    }

    #[test]
    fn test_grouped_sales_no_match_is_empty() {
        let table = ledger(vec![(
            2023,
            "Actuals",
            "Sales",
            "Software",
            months(1.0, 1.0),
        )]);
        let result = grouped_sales(&table, 2021).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_queries_reject_empty_dataset() {
        let table = ledger(vec![]);
        assert!(matches!(
            grouped_sales(&table, 2023),
            Err(DashboardError::EmptyDataset)
        ));
        assert!(matches!(
            monthly_series(&table, 2023, "Software"),
            Err(DashboardError::EmptyDataset)
        ));
        assert!(matches!(
            yearly_account_totals(&table),
            Err(DashboardError::EmptyDataset)
        ));
    }

    #[test]
    fn test_monthly_series_orders_by_month() {
        let table = ledger(vec![
            (2023, "Budget", "Sales", "Software", months(90.0, 210.0)),
            (2023, "Actuals", "Sales", "Software", months(100.0, 200.0)),
            (2023, "Actuals", "Sales", "Hardware", months(5.0, 5.0)),
        ]);

        let result = monthly_series(&table, 2023, "Software").unwrap();
        assert_eq!(result.len(), 24);
        assert_eq!(result.rows[0].month, Month::Jan);
        assert_eq!(result.rows[0].scenario, "Actuals");
        assert_eq!(result.rows[0].sales, 100.0);
        assert_eq!(result.rows[1].scenario, "Budget");
        assert_eq!(result.rows[1].sales, 90.0);
        assert_eq!(result.rows[2].month, Month::Feb);
        assert!(result.rows.windows(2).all(|w| w[0].month <= w[1].month));
    }

    #[test]
    fn test_monthly_series_sums_duplicates() {
        let table = ledger(vec![
            (2023, "Actuals", "Sales", "Software", months(100.0, 200.0)),
            (2023, "Actuals", "Sales", "Software", months(10.0, 20.0)),
        ]);

        let result = monthly_series(&table, 2023, "Software").unwrap();
        assert_eq!(result.len(), 12);
        assert_eq!(result.rows[0].sales, 110.0);
        assert_eq!(result.rows[1].sales, 220.0);
    }

    #[test]
    fn test_yearly_account_totals_removes_sign() {
        let table = ledger(vec![
            (2022, "Actuals", "Expense", "Software", months(-50.0, 0.0)),
            (2022, "Actuals", "Expense", "Hardware", months(20.0, -5.0)),
            (2023, "Actuals", "Expense", "Software", months(-1.0, 0.0)),
            (2022, "Budget", "Expense", "Software", months(-999.0, 0.0)),
            (2022, "Actuals", "Sales", "Software", months(500.0, 0.0)),
        ]);

        let result = yearly_account_totals(&table).unwrap();
        assert_eq!(
            result.rows,
            vec![
                AccountTotalRow {
                    account: "Expense".to_string(),
                    year: 2022,
                    amount: 75.0,
                },
                AccountTotalRow {
                    account: "Expense".to_string(),
                    year: 2023,
                    amount: 1.0,
                },
            ]
        );
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = LedgerTable::new(
            vec!["Year".to_string(), "Account".to_string(), "Jan".to_string()],
            vec![vec![2023.into(), "Sales".into(), 1.0.into()]],
        );
        assert!(matches!(
            grouped_sales(&table, 2023),
            Err(DashboardError::Schema { .. })
        ));
        assert!(matches!(
            monthly_series(&table, 2023, "Software"),
            Err(DashboardError::Schema { .. })
        ));
        assert!(matches!(
            yearly_account_totals(&table),
            Err(DashboardError::Schema { .. })
        ));
    }

    #[test]
    fn test_non_integral_year_is_skipped() {
        let mut columns: Vec<String> = DIMENSION_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(month_columns().iter().map(|m| m.to_string()));
        let row = |year: Value| {
            let mut row: Vec<Value> =
                vec![year, "Actuals".into(), "Expense".into(), "Software".into()];
            row.extend(months(-50.0, 0.0).iter().map(|&v| Value::Number(v)));
            row
        };
        let table = LedgerTable::new(
            columns,
            vec![row("FY22".into()), row(Value::Empty), row(2022.into())],
        );

        let result = yearly_account_totals(&table).unwrap();
        assert_eq!(
            result.rows,
            vec![AccountTotalRow {
                account: "Expense".to_string(),
                year: 2022,
                amount: 50.0,
            }]
        );
    }

    #[test]
    fn test_blank_account_is_not_a_non_sales_account() {
        let mut columns: Vec<String> = DIMENSION_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(month_columns().iter().map(|m| m.to_string()));
        let mut blank: Vec<Value> =
            vec![2022.into(), "Actuals".into(), Value::Empty, "Software".into()];
        blank.extend(months(-7.0, 0.0).iter().map(|&v| Value::Number(v)));
        let table = LedgerTable::new(columns, vec![blank]);

        assert!(yearly_account_totals(&table).unwrap().is_empty());
    }

    #[test]
    fn test_text_years_still_match() {
        let mut columns: Vec<String> = DIMENSION_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.extend(month_columns().iter().map(|m| m.to_string()));
        let mut row: Vec<Value> = vec![
            Value::Text("2023.0".to_string()),
            "Actuals".into(),
            "Sales".into(),
            "Software".into(),
        ];
        row.extend(months(4.0, 6.0).iter().map(|&v| Value::Number(v)));
        let table = LedgerTable::new(columns, vec![row]);

        let result = grouped_sales(&table, 2023).unwrap();
        assert_eq!(result.rows[0].sales, 10.0);
    }
}
