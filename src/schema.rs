use crate::utils::last_day_of_month;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const YEAR: &str = "Year";
pub const SCENARIO: &str = "Scenario";
pub const ACCOUNT: &str = "Account";
pub const BUSINESS_UNIT: &str = "business_unit";

pub const SALES_ACCOUNT: &str = "Sales";
pub const ACTUALS_SCENARIO: &str = "Actuals";
pub const DEFAULT_SERIES_BUSINESS_UNIT: &str = "Software";

/// Dimension columns every ledger upload is expected to carry.
pub const DIMENSION_COLUMNS: [&str; 4] = [YEAR, SCENARIO, ACCOUNT, BUSINESS_UNIT];

/// One of the twelve measure columns of the wide ledger.
///
/// Variant order is calendar order, so sorting by `Month` sorts Jan→Dec.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Column header used for this month in the wide ledger.
    pub fn column(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    pub fn from_column(name: &str) -> Option<Month> {
        Month::ALL.into_iter().find(|m| m.column() == name)
    }

    /// Calendar number, 1 = January.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn to_chrono(self) -> chrono::Month {
        match self {
            Month::Jan => chrono::Month::January,
            Month::Feb => chrono::Month::February,
            Month::Mar => chrono::Month::March,
            Month::Apr => chrono::Month::April,
            Month::May => chrono::Month::May,
            Month::Jun => chrono::Month::June,
            Month::Jul => chrono::Month::July,
            Month::Aug => chrono::Month::August,
            Month::Sep => chrono::Month::September,
            Month::Oct => chrono::Month::October,
            Month::Nov => chrono::Month::November,
            Month::Dec => chrono::Month::December,
        }
    }

    /// Last calendar day of this month in `year`, for plotting on a date axis.
    pub fn period_end(self, year: i32) -> Option<NaiveDate> {
        last_day_of_month(year, self.number())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The twelve measure column names in calendar order.
pub fn month_columns() -> Vec<&'static str> {
    Month::ALL.iter().map(|m| m.column()).collect()
}

/// Account picked in the selection controls.
///
/// Carried through the dashboard configuration but not consumed by any query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum SelectedAccount {
    #[default]
    Sales,
    Profit,
    Expenses,
}
