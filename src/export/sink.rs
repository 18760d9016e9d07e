//! Delivery of the finished archive.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Destination for a finished archive
///
/// Implementations receive the suggested filename and the complete archive
/// bytes exactly once per successful export.
#[async_trait::async_trait]
pub trait SaveSink: Send + Sync {
    /// Persist or hand off `contents` under `filename`
    async fn save(&self, filename: &str, contents: Vec<u8>) -> Result<()>;
}

/// [`SaveSink`] writing archives into a local directory
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Write archives into `dir`, creating it on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl SaveSink for DirectorySink {
    async fn save(&self, filename: &str, contents: Vec<u8>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, &contents).await?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "archive saved");
        Ok(())
    }
}
