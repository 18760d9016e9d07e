//! Error types for tribute-archive
//!
//! Errors come in two tiers:
//! - [`Error`] / [`ExportError`]: failures that make a whole operation impossible.
//!   These propagate to the caller and no archive is delivered.
//! - [`FetchError`]: a single image could not be downloaded. The exporter records
//!   these as placeholder entries inside the archive and never escalates them.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for tribute-archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tribute-archive
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "export.concurrency")
        key: Option<String>,
    },

    /// A submission failed validation before persistence
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The offending field (e.g., "name")
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The export pipeline could not produce or deliver an archive
    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    /// The upstream record source could not be read
    #[error("source error: {0}")]
    Source(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that abort an export as a whole
#[derive(Debug, Error)]
pub enum ExportError {
    /// The tabular summary could not be serialized
    #[error("failed to build summary workbook: {reason}")]
    Summary {
        /// Underlying serializer message
        reason: String,
    },

    /// The archive could not be compressed
    #[error("failed to compress archive: {reason}")]
    Compression {
        /// Underlying compressor message
        reason: String,
    },

    /// The save sink rejected the finished archive
    #[error("failed to deliver {filename}: {reason}")]
    Delivery {
        /// The archive filename that was being saved
        filename: String,
        /// Why the sink failed
        reason: String,
    },
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Summary {
            reason: e.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::Compression {
            reason: e.to_string(),
        }
    }
}

/// Failure to download a single image
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is not an absolute http(s) URL
    #[error("invalid image URL: {url}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
    },

    /// The request could not be sent or the connection failed
    #[error("request failed: {0}")]
    Request(String),

    /// The host answered with a non-success status
    #[error("HTTP {status}")]
    Status {
        /// HTTP status code returned by the image host
        status: u16,
    },

    /// The fetch did not finish within the configured timeout
    #[error("timed out after {after:?}")]
    Timeout {
        /// The timeout that elapsed
        after: Duration,
    },

    /// The response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
}
