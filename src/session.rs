use crate::cache::{LoadCache, UploadKey};
use crate::config::DashboardConfig;
use crate::dataset::LedgerTable;
use crate::error::{DashboardError, Result};
use crate::ingestion::Upload;
use crate::Dashboard;
use log::{error, info};
use std::sync::Arc;

/// Per-user dashboard state: the selection controls and the parsed upload.
#[derive(Debug)]
pub struct DashboardSession {
    config: DashboardConfig,
    cache: LoadCache,
}

impl DashboardSession {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: LoadCache::new(),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DashboardConfig {
        &mut self.config
    }

    /// Parses `upload`, reusing the previous parse when the bytes are unchanged.
    pub fn upload(&mut self, upload: &Upload) -> Result<Arc<LedgerTable>> {
        self.cache.get_or_load(upload).map_err(|e| {
            error!("Upload '{}' rejected: {}", upload.name, e);
            e
        })
    }

    pub fn upload_key(&self) -> Option<&UploadKey> {
        self.cache.current_key()
    }

    pub fn dataset(&self) -> Result<Arc<LedgerTable>> {
        self.cache.current().ok_or(DashboardError::NoUpload)
    }

    pub fn cache(&self) -> &LoadCache {
        &self.cache
    }

    /// Runs every dashboard query against the current upload.
    pub fn build(&self) -> Result<Dashboard> {
        let dataset = self.dataset()?;
        info!(
            "Building dashboard for {} / {:?}",
            self.config.selected_year, self.config.selected_account
        );
        crate::build_dashboard(&dataset, &self.config)
    }
}
