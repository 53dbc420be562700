use crate::dataset::LedgerTable;
use crate::error::Result;
use crate::ingestion::{load_ledger, Upload};
use log::info;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Identity of an upload: the SHA-256 of its bytes, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadKey(String);

impl UploadKey {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UploadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

/// Holds the parsed ledger for the most recent upload.
///
/// A repeated upload with the same content is served from memory; any other upload
/// evicts the held table before it is parsed.
#[derive(Debug, Default)]
pub struct LoadCache {
    entry: Option<(UploadKey, Arc<LedgerTable>)>,
    stats: CacheStats,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, upload: &Upload) -> Result<Arc<LedgerTable>> {
        let key = UploadKey::of(&upload.bytes);
        self.get_or_load_with(key, || load_ledger(upload))
    }

    pub fn get_or_load_with<F>(&mut self, key: UploadKey, load: F) -> Result<Arc<LedgerTable>>
    where
        F: FnOnce() -> Result<LedgerTable>,
    {
        if let Some((cached_key, table)) = &self.entry {
            if *cached_key == key {
                self.stats.hits += 1;
                info!("Ledger cache hit for upload {}", short(&key));
                return Ok(Arc::clone(table));
            }
        }

        self.evict();
        self.stats.misses += 1;
        info!("Ledger cache miss for upload {}; parsing", short(&key));

        let table = Arc::new(load()?);
        self.entry = Some((key, Arc::clone(&table)));
        Ok(table)
    }

    pub fn current(&self) -> Option<Arc<LedgerTable>> {
        self.entry.as_ref().map(|(_, table)| Arc::clone(table))
    }

    pub fn current_key(&self) -> Option<&UploadKey> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    pub fn evict(&mut self) {
        if self.entry.take().is_some() {
            self.stats.evictions += 1;
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

fn short(key: &UploadKey) -> &str {
    &key.as_str()[..12]
}
