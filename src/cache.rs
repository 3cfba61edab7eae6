// Write-through copy of the last raw search response, kept for debugging and
// for replaying a run offline.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::offer::{offers_from_value, RawOffer};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cached response has no offers list")]
    MissingOffers,
}

#[derive(Debug, Clone)]
pub struct ResponseCache {
    path: PathBuf,
}

impl ResponseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }

    // Overwrite the cache file with `body`, indented four spaces
    pub fn store(&self, body: &serde_json::Value) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        body.serialize(&mut serializer)?;

        fs::write(&self.path, buf).map_err(|e| self.io_error(e))?;
        info!(path = %self.path.display(), "Flight data saved");
        Ok(())
    }

    pub fn load(&self) -> Result<serde_json::Value, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        Ok(serde_json::from_str(&content)?)
    }

    // Offers of the cached response
    pub fn load_offers(&self) -> Result<Vec<RawOffer>, CacheError> {
        offers_from_value(&self.load()?).ok_or(CacheError::MissingOffers)
    }
}
