//! In-memory archive assembly and compression.

use std::io::Write;

use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use super::plan::DownloadTask;
use crate::error::{ExportError, FetchError};

/// In-memory file table for one export
///
/// Entries keep insertion order. Image entries are stored under `images_dir/`.
pub(crate) struct ArchiveBuilder {
    images_dir: String,
    entries: Vec<(String, Vec<u8>)>,
    images: usize,
}

impl ArchiveBuilder {
    pub(crate) fn new(images_dir: &str) -> Self {
        Self {
            images_dir: images_dir.to_string(),
            entries: Vec::new(),
            images: 0,
        }
    }

    /// Add a file at the archive root
    pub(crate) fn add_file(&mut self, name: &str, contents: Vec<u8>) {
        self.entries.push((name.to_string(), contents));
    }

    /// Store fetched image bytes under the task's target name
    pub(crate) fn add_image(&mut self, task: &DownloadTask, contents: Vec<u8>) {
        let name = format!("{}/{}", self.images_dir, task.target_name);
        self.entries.push((name, contents));
        self.images += 1;
    }

    /// Store a text placeholder explaining why the task's image is missing
    pub(crate) fn add_placeholder(&mut self, task: &DownloadTask, error: &FetchError) {
        let name = format!("{}/{}", self.images_dir, task.placeholder_name());
        let body = placeholder_text(&task.source_url, error);
        self.entries.push((name, body.into_bytes()));
        self.images += 1;
    }

    /// Number of entries under the images directory
    pub(crate) fn image_entries(&self) -> usize {
        self.images
    }

    /// Compress the file table into a zip archive
    pub(crate) fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        // Explicit directory entry so the folder exists even with no images
        zip.add_directory(format!("{}/", self.images_dir), options)?;

        for (name, contents) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(contents).map_err(|e| ExportError::Compression {
                reason: format!("failed to write {name}: {e}"),
            })?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Compress on a blocking worker so the async runtime keeps serving fetches
    pub(crate) async fn compress(self) -> Result<Vec<u8>, ExportError> {
        tokio::task::spawn_blocking(move || self.finish())
            .await
            .map_err(|e| ExportError::Compression {
                reason: format!("compression task panicked: {e}"),
            })?
    }
}

/// Contents of a `.error.txt` placeholder
pub(crate) fn placeholder_text(url: &str, error: &FetchError) -> String {
    format!("Failed to download: {url}\nError: {error}")
}
