use crate::error::{DashboardError, Result};
use crate::schema::{SelectedAccount, DEFAULT_SERIES_BUSINESS_UNIT};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selection controls and dashboard options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DashboardConfig {
    #[schemars(description = "Years offered in the year selector, most recent first.")]
    pub supported_years: Vec<i32>,

    #[schemars(description = "Year driving the grouped sales and monthly series queries.")]
    pub selected_year: i32,

    #[schemars(
        description = "Account picked in the account selector. Accepted but not used by any query."
    )]
    pub selected_account: SelectedAccount,

    #[schemars(description = "Business unit plotted in the monthly series.")]
    pub series_business_unit: String,

    #[schemars(description = "Number of ledger rows included in the data preview.")]
    pub preview_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let supported_years = vec![2023, 2022, 2021];
        Self {
            selected_year: supported_years[0],
            supported_years,
            selected_account: SelectedAccount::default(),
            series_business_unit: DEFAULT_SERIES_BUSINESS_UNIT.to_string(),
            preview_rows: 20,
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported_years.is_empty() {
            return Err(DashboardError::InvalidConfig(
                "at least one supported year is required".to_string(),
            ));
        }
        if !self.supported_years.contains(&self.selected_year) {
            return Err(DashboardError::InvalidConfig(format!(
                "selected year {} is not one of {:?}",
                self.selected_year, self.supported_years
            )));
        }
        if self.series_business_unit.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "series business unit must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Switches the year selector, rejecting years outside `supported_years`.
    pub fn select_year(&mut self, year: i32) -> Result<()> {
        if !self.supported_years.contains(&year) {
            return Err(DashboardError::InvalidConfig(format!(
                "selected year {} is not one of {:?}",
                year, self.supported_years
            )));
        }
        self.selected_year = year;
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }
}
