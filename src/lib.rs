//! # Ledger Dashboard
//!
//! Reshapes a wide monthly financial ledger into the query results behind a sales
//! dashboard.
//!
//! ## Core Concepts
//!
//! - **Ledger**: one row per (Year, Scenario, Account, business_unit) with twelve month
//!   columns `Jan`..`Dec`. Amounts are signed.
//! - **Unpivot**: wide rows become one row per month, kept in calendar order
//! - **Queries**: grouped sales, a monthly sales series and yearly account totals, each a
//!   filter → reshape → group → sort pipeline over the ledger
//! - **Overview**: fixed headline figures and gauges shown above the charts
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_dashboard::*;
//!
//! let mut session = DashboardSession::new(DashboardConfig::default())?;
//! session.upload(&Upload::from_path("ledger.xlsx".as_ref())?)?;
//!
//! let dashboard = session.build()?;
//! if let Some(rows) = dashboard.grouped_sales.rows() {
//!     for row in rows {
//!         println!("{} {} {}", row.business_unit, row.scenario, row.sales);
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingestion;
pub mod overview;
pub mod pipeline;
pub mod query;
pub mod reshape;
pub mod schema;
pub mod session;
pub mod utils;

pub use cache::{CacheStats, LoadCache, UploadKey};
pub use config::DashboardConfig;
pub use dataset::{DataPreview, LedgerTable, RowRef, Value};
pub use error::{DashboardError, Result};
pub use ingestion::{load_ledger, Upload, UploadFormat};
pub use overview::{overview_metrics, GaugeMetric, HeadlineMetric, OverviewPanel};
pub use pipeline::Predicate;
pub use query::*;
pub use reshape::{unpivot, unpivot_with, LongRow};
pub use schema::*;
pub use session::DashboardSession;
pub use utils::magnitude;

use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of one data-derived query. A failed query does not stop the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome<R> {
    Ready(QueryResult<R>),
    Failed { message: String },
}

impl<R> QueryOutcome<R> {
    fn from_result(name: &str, result: Result<QueryResult<R>>) -> Self {
        match result {
            Ok(result) => {
                debug!("{} query returned {} rows", name, result.len());
                QueryOutcome::Ready(result)
            }
            Err(e) => {
                warn!("{} query failed: {}", name, e);
                QueryOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn rows(&self) -> Option<&[R]> {
        match self {
            QueryOutcome::Ready(result) => Some(&result.rows),
            QueryOutcome::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, QueryOutcome::Ready(_))
    }
}

/// Everything the presentation layer renders for one set of selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dashboard {
    pub selected_year: i32,
    pub selected_account: SelectedAccount,
    pub preview: DataPreview,
    pub overview: Vec<OverviewPanel>,
    pub grouped_sales: QueryOutcome<GroupedSalesRow>,
    pub monthly_series: QueryOutcome<MonthlySalesRow>,
    pub account_totals: QueryOutcome<AccountTotalRow>,
}

impl Dashboard {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Dashboard)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct DashboardProcessor;

impl DashboardProcessor {
    pub fn process(table: &LedgerTable, config: &DashboardConfig) -> Result<Dashboard> {
        config.validate()?;
        table.ensure_not_empty()?;

        info!(
            "Processing ledger of {} rows for year {}",
            table.len(),
            config.selected_year
        );

        let year = config.selected_year;
        Ok(Dashboard {
            selected_year: year,
            selected_account: config.selected_account,
            preview: table.preview(config.preview_rows),
            overview: overview_metrics(),
            grouped_sales: QueryOutcome::from_result(
                "Grouped sales",
                grouped_sales(table, year),
            ),
            monthly_series: QueryOutcome::from_result(
                "Monthly series",
                monthly_series(table, year, &config.series_business_unit),
            ),
            account_totals: QueryOutcome::from_result(
                "Yearly account totals",
                yearly_account_totals(table),
            ),
        })
    }
}

pub fn build_dashboard(table: &LedgerTable, config: &DashboardConfig) -> Result<Dashboard> {
    DashboardProcessor::process(table, config)
}
