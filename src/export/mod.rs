//! Export pipeline: tribute records in, one zip archive out.
//!
//! The pipeline is split by concern:
//! - [`plan`] - normalization into summary rows and download tasks
//! - [`summary`] - the single-sheet `.xlsx` workbook
//! - [`fetcher`] - the [`ImageFetcher`] seam and its HTTP implementation
//! - `download` - bounded-concurrency fetching with per-task isolation
//! - `archive` - in-memory file table and zip compression
//! - [`sink`] - delivery of the finished archive
//!
//! A failed image never aborts an export: it becomes a `.error.txt` placeholder
//! next to where the image would have been. Only summary, compression and
//! delivery failures are fatal.

mod archive;
mod download;
pub mod fetcher;
pub mod plan;
pub mod sink;
pub mod summary;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use plan::{DownloadTask, ExportPlan, SummaryRow, plan_export};
pub use sink::{DirectorySink, SaveSink};
pub use summary::{SUMMARY_HEADERS, build_workbook};

use std::sync::Arc;

use chrono::Utc;

use crate::config::Config;
use crate::error::{ExportError, Result};
use crate::types::{ExportProgress, ExportReport, TributeRecord};
use crate::utils::archive_filename;
use archive::ArchiveBuilder;

/// Turns tribute records into a downloadable archive
///
/// One exporter can run any number of exports; each call owns its own archive
/// state, so concurrent exports never share a file table.
#[derive(Clone)]
pub struct TributeExporter {
    config: Arc<Config>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl std::fmt::Debug for TributeExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TributeExporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TributeExporter {
    /// Validate `config` and build an exporter fetching images over HTTP
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpImageFetcher::new()?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Validate `config` and build an exporter around a custom fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ImageFetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Export `records` into one archive and hand it to `sink`
    ///
    /// `on_progress` is called from the exporter's own task, in order:
    /// [`ExportProgress::Preparing`], `Downloading { completed: 0, total }`,
    /// one `Downloading` update per settled image, [`ExportProgress::Compressing`]
    /// and finally [`ExportProgress::Done`] once the sink accepted the archive.
    /// The `total/total` update is emitted exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] (wrapped in [`crate::Error::Export`]) when the
    /// summary cannot be built, the archive cannot be compressed, or the sink
    /// rejects it. Image fetch failures are never returned; they become
    /// placeholders inside the archive.
    pub async fn export<F>(
        &self,
        records: &[TributeRecord],
        sink: &dyn SaveSink,
        mut on_progress: F,
    ) -> Result<ExportReport>
    where
        F: FnMut(&ExportProgress),
    {
        let export_config = &self.config.export;
        on_progress(&ExportProgress::Preparing);

        let plan = plan_export(records, &self.config);
        let workbook = build_workbook(&plan.rows, &export_config.sheet_name)?;

        let mut archive = ArchiveBuilder::new(&export_config.images_dir);
        archive.add_file(&export_config.workbook_name, workbook);

        let total = plan.downloads.len();
        tracing::info!(
            records = plan.rows.len(),
            images = total,
            concurrency = export_config.concurrency,
            mode = ?export_config.mode,
            "starting tribute export"
        );
        on_progress(&ExportProgress::Downloading {
            completed: 0,
            total,
        });

        let mut completed = 0;
        let mut failed = 0;
        download::download_all(
            &plan.downloads,
            self.fetcher.as_ref(),
            export_config,
            |task, outcome| {
                match outcome {
                    Ok(bytes) => archive.add_image(task, bytes),
                    Err(error) => {
                        tracing::warn!(
                            url = %task.source_url,
                            target = %task.target_name,
                            error = %error,
                            "image download failed, writing placeholder"
                        );
                        archive.add_placeholder(task, &error);
                        failed += 1;
                    }
                }
                completed += 1;
                on_progress(&ExportProgress::Downloading { completed, total });
            },
        )
        .await;
        debug_assert_eq!(archive.image_entries(), total);

        on_progress(&ExportProgress::Compressing);
        let bytes = archive.compress().await?;
        let archive_bytes = bytes.len();

        let filename = archive_filename(&export_config.archive_prefix, Utc::now().date_naive());
        sink.save(&filename, bytes)
            .await
            .map_err(|e| ExportError::Delivery {
                filename: filename.clone(),
                reason: e.to_string(),
            })?;

        let report = ExportReport {
            filename,
            records: plan.rows.len(),
            images_total: total,
            images_downloaded: total - failed,
            images_failed: failed,
            archive_bytes,
        };
        tracing::info!(
            filename = %report.filename,
            downloaded = report.images_downloaded,
            failed = report.images_failed,
            bytes = report.archive_bytes,
            "tribute export complete"
        );
        on_progress(&ExportProgress::Done);
        Ok(report)
    }
}

/// Export `records` with the default configuration and the HTTP fetcher
///
/// # Example
///
/// ```no_run
/// use tribute_archive::{DirectorySink, TributeRecord, export_tributes};
///
/// # async fn example(records: Vec<TributeRecord>) -> tribute_archive::Result<()> {
/// let sink = DirectorySink::new("exports");
/// export_tributes(&records, &sink, |progress| println!("{progress}")).await?;
/// # Ok(())
/// # }
/// ```
pub async fn export_tributes<F>(
    records: &[TributeRecord],
    sink: &dyn SaveSink,
    on_progress: F,
) -> Result<ExportReport>
where
    F: FnMut(&ExportProgress),
{
    TributeExporter::new(Config::default())?
        .export(records, sink, on_progress)
        .await
}
