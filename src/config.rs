//! Configuration types for tribute-archive

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for [`TributeExporter`](crate::TributeExporter)
///
/// Every field carries a serde default, so an empty JSON object deserializes
/// to [`Config::default()`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Export pipeline settings (concurrency, naming, timeouts)
    #[serde(default)]
    pub export: ExportConfig,

    /// How timestamps are rendered in the summary and gallery
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Check cross-field constraints that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        let export = &self.export;

        if export.concurrency == 0 {
            return Err(config_error(
                "concurrency must be at least 1",
                "export.concurrency",
            ));
        }
        if export.fetch_timeout.is_some_and(|t| t.is_zero()) {
            return Err(config_error(
                "fetch_timeout must be positive (use null for no timeout)",
                "export.fetch_timeout",
            ));
        }
        if !is_plain_extension(&export.fallback_extension) {
            return Err(config_error(
                "fallback_extension must be 1-5 ASCII alphanumeric characters",
                "export.fallback_extension",
            ));
        }
        for (key, value) in [
            ("export.workbook_name", &export.workbook_name),
            ("export.images_dir", &export.images_dir),
            ("export.archive_prefix", &export.archive_prefix),
        ] {
            if value.trim().is_empty() || value.contains('/') || value.contains('\\') {
                return Err(config_error(
                    "must be a non-empty name without path separators",
                    key,
                ));
            }
        }
        // Sheet names are capped at 31 characters by the workbook format
        if export.sheet_name.is_empty() || export.sheet_name.chars().count() > 31 {
            return Err(config_error(
                "sheet_name must be 1-31 characters",
                "export.sheet_name",
            ));
        }
        if !(1.0..=MAX_BACKOFF_MULTIPLIER).contains(&export.retry.backoff_multiplier) {
            return Err(config_error(
                "backoff_multiplier must be between 1.0 and 10.0",
                "export.retry.backoff_multiplier",
            ));
        }
        if !(-14 * 60..=14 * 60).contains(&self.display.utc_offset_minutes) {
            return Err(config_error(
                "utc_offset_minutes must be within +/-14 hours",
                "display.utc_offset_minutes",
            ));
        }

        Ok(())
    }
}

/// Largest accepted retry backoff multiplier
const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;

fn config_error(message: &str, key: &str) -> Error {
    Error::Config {
        message: message.to_string(),
        key: Some(key.to_string()),
    }
}

pub(crate) fn is_plain_extension(ext: &str) -> bool {
    (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Export pipeline settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum number of image fetches in flight at once (default: 5)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How the concurrency limit is enforced (default: batched)
    #[serde(default)]
    pub mode: ConcurrencyMode,

    /// Per-fetch timeout in seconds (default: 30, `null` = wait indefinitely)
    ///
    /// Without a timeout a single hung host stalls its whole batch.
    #[serde(
        default = "default_fetch_timeout",
        with = "optional_duration_serde"
    )]
    pub fetch_timeout: Option<Duration>,

    /// Extension used when an image URL has no usable suffix (default: "jpg")
    #[serde(default = "default_fallback_extension")]
    pub fallback_extension: String,

    /// Name of the summary workbook at the archive root (default: "tributes.xlsx")
    #[serde(default = "default_workbook_name")]
    pub workbook_name: String,

    /// Name of the single worksheet (default: "Tributes")
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Directory inside the archive holding images (default: "images")
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    /// Archive filename prefix, followed by `_<YYYY-MM-DD>.zip` (default: "tributes_archive")
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,

    /// Retry policy for transient fetch failures (default: no retries)
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            mode: ConcurrencyMode::default(),
            fetch_timeout: default_fetch_timeout(),
            fallback_extension: default_fallback_extension(),
            workbook_name: default_workbook_name(),
            sheet_name: default_sheet_name(),
            images_dir: default_images_dir(),
            archive_prefix: default_archive_prefix(),
            retry: RetryConfig::default(),
        }
    }
}

/// Strategy for bounding concurrent image fetches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// Fixed-size batches with a strict barrier: batch n+1 starts only after
    /// every fetch in batch n has settled (default)
    #[default]
    Batched,
    /// Rolling pool: a new fetch starts as soon as any in-flight fetch settles
    Pooled,
}

/// Retry configuration for transient image fetch failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of retries after the first attempt (default: 0)
    #[serde(default)]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds (default: 500)
    #[serde(default = "default_initial_delay", with = "duration_millis_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries, in milliseconds (default: 10000)
    #[serde(default = "default_max_delay", with = "duration_millis_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Timestamp rendering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Offset from UTC applied before formatting, in minutes (default: 420, UTC+7)
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Render years in the Buddhist era (Gregorian + 543) (default: true)
    #[serde(default = "default_true")]
    pub buddhist_era: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            buddhist_era: true,
        }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_fetch_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_fallback_extension() -> String {
    "jpg".to_string()
}

fn default_workbook_name() -> String {
    "tributes.xlsx".to_string()
}

fn default_sheet_name() -> String {
    "Tributes".to_string()
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_archive_prefix() -> String {
    "tributes_archive".to_string()
}

fn default_initial_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_utc_offset_minutes() -> i32 {
    7 * 60
}

fn default_true() -> bool {
    true
}

// Millisecond Duration serialization helper
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
