//! # tribute-archive
//!
//! Export pipeline for memorial tribute walls: a list of visitor tributes goes
//! in, one zip archive comes out. The archive holds a spreadsheet summary of
//! every tribute plus every photo the tributes reference.
//!
//! ## Design Philosophy
//!
//! tribute-archive is designed to be:
//! - **Failure tolerant** - A broken image link becomes a placeholder file, never a failed export
//! - **Polite to image hosts** - Downloads run with bounded concurrency and a per-fetch timeout
//! - **Library-first** - No CLI or UI; callers bring their own records and save sink
//! - **Observable** - Coarse progress via callback, detail via `tracing`
//!
//! ## Quick Start
//!
//! ```no_run
//! use tribute_archive::{Config, DirectorySink, JsonFileSource, TributeExporter, TributeSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = JsonFileSource::new("tributes.json").fetch_all().await?;
//!
//!     let exporter = TributeExporter::new(Config::default())?;
//!     let sink = DirectorySink::new("exports");
//!     let report = exporter
//!         .export(&records, &sink, |progress| println!("{progress}"))
//!         .await?;
//!
//!     println!("saved {} ({} images failed)", report.filename, report.images_failed);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Export pipeline
pub mod export;
/// Gallery listing helpers
pub mod gallery;
/// Retry logic with exponential backoff
pub mod retry;
/// Record sources
pub mod source;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ConcurrencyMode, Config, DisplayConfig, ExportConfig, RetryConfig};
pub use error::{Error, ExportError, FetchError, Result};
pub use export::{
    DirectorySink, HttpImageFetcher, ImageFetcher, SaveSink, TributeExporter, export_tributes,
};
pub use gallery::{CardStyle, GalleryFilter};
pub use source::{JsonFileSource, TributeSource};
pub use types::{
    ExportProgress, ExportReport, ImageUrls, MAX_IMAGES_PER_TRIBUTE, NewTribute, TributeId,
    TributeRecord,
};
