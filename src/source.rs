//! Where tribute records come from.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::TributeRecord;

/// Supplier of the full tribute list for an export
#[async_trait::async_trait]
pub trait TributeSource: Send + Sync {
    /// Load every record, in the order the source stores them
    async fn fetch_all(&self) -> Result<Vec<TributeRecord>>;
}

/// [`TributeSource`] reading a JSON array of table rows from disk
///
/// Row shapes are decoded leniently: numeric or textual ids, a missing or
/// malformed `created_at`, and every form of the `image_url` column.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Read rows from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the rows are read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl TributeSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<TributeRecord>> {
        let raw = tokio::fs::read(&self.path).await?;
        let records: Vec<TributeRecord> = serde_json::from_slice(&raw).map_err(|e| {
            Error::Source(format!("{} is not a tribute table dump: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "tributes loaded");
        Ok(records)
    }
}
