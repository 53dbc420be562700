use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load ledger upload: {0}")]
    Load(String),

    #[error("No ledger uploaded yet: upload a file through config")]
    NoUpload,

    #[error("Required column '{column}' is missing from the ledger")]
    Schema { column: String },

    #[error("Ledger contains no rows")]
    EmptyDataset,

    #[error("Invalid value '{value}' in column '{column}' at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Invalid dashboard configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn schema(column: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
        }
    }

    /// Errors that stop the whole session rather than a single query.
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            Self::Load(_) | Self::NoUpload | Self::EmptyDataset | Self::Io(_)
        )
    }
}

#[cfg(feature = "xlsx")]
impl From<calamine::Error> for DashboardError {
    fn from(err: calamine::Error) -> Self {
        Self::Load(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
