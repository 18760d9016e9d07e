//! Core types for tribute-archive
//!
//! Rows arrive from the upstream store with loosely typed columns. Every
//! shape-ambiguous column is decoded exactly once, at deserialization time,
//! into a canonical Rust type; nothing downstream inspects the raw shape again.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

/// Maximum number of photos a single submission may carry
pub const MAX_IMAGES_PER_TRIBUTE: usize = 10;

/// Opaque identifier assigned by the upstream store
///
/// The store may emit numeric or textual ids; both decode to the same text form.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TributeId(pub String);

impl TributeId {
    /// Create a new TributeId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for TributeId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for TributeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TributeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TributeId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Canonical ordered sequence of image URLs attached to a tribute
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageUrls(Vec<String>);

impl ImageUrls {
    /// Build from already-normalized URLs, dropping empty entries
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            urls.into_iter()
                .map(Into::into)
                .filter(|u: &String| !u.is_empty())
                .collect(),
        )
    }

    /// Decode the textual form of the column
    ///
    /// A JSON-encoded array yields its non-empty string elements. Anything else
    /// (a bare URL, invalid JSON, a JSON scalar or object) is treated as one URL.
    /// An empty string yields no URLs.
    pub fn parse_str(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => Self::from_array(&items),
            _ => Self(vec![raw.to_string()]),
        }
    }

    /// Decode any JSON value found in the column; never fails
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse_str(s),
            Value::Array(items) => Self::from_array(items),
            _ => Self::default(),
        }
    }

    fn from_array(items: &[Value]) -> Self {
        Self(
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Number of URLs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the tribute has no images
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the URLs in order
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Borrow the URLs as a slice
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a ImageUrls {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ImageUrls {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// One visitor-authored tribute, as read from the upstream store
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TributeRecord {
    /// Store-assigned identifier
    pub id: TributeId,

    /// Author display name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// Free-text relationship to the deceased
    #[serde(default)]
    pub relationship: Option<String>,

    /// Legacy message column
    #[serde(default)]
    pub message: Option<String>,

    /// Canonical message column, preferred over `message` when non-empty
    #[serde(default)]
    pub messages: Option<String>,

    /// Insertion time; `None` when missing or unparseable
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Normalized image URLs decoded from the `image_url` column
    #[serde(rename = "image_url", default)]
    pub image_urls: ImageUrls,
}

impl TributeRecord {
    /// The message body, preferring `messages` over the legacy `message`
    pub fn body(&self) -> &str {
        [&self.messages, &self.message]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    /// True when at least one image is attached
    pub fn has_images(&self) -> bool {
        !self.image_urls.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_timestamp(&s),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

/// Parse the timestamp formats the store is known to emit
///
/// Accepts RFC 3339, Postgres text output (`2024-01-15 10:30:00.123+00`) and
/// offset-less ISO timestamps, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// A visitor submission before it is persisted
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewTribute {
    /// Author display name (required)
    pub name: String,
    /// Relationship to the deceased (optional)
    #[serde(serialize_with = "blank_as_null")]
    pub relationship: Option<String>,
    /// Message body (required)
    pub message: String,
    /// Uploaded photo URLs, in upload order
    #[serde(rename = "image_url", serialize_with = "serialize_image_column")]
    pub image_urls: Vec<String>,
}

impl NewTribute {
    /// Reject submissions the store would refuse
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.message.trim().is_empty() {
            return Err(Error::Validation {
                field: "message",
                reason: "must not be empty".to_string(),
            });
        }
        if self.image_urls.len() > MAX_IMAGES_PER_TRIBUTE {
            return Err(Error::Validation {
                field: "image_url",
                reason: format!(
                    "at most {MAX_IMAGES_PER_TRIBUTE} images allowed, got {}",
                    self.image_urls.len()
                ),
            });
        }
        if let Some(url) = self.image_urls.iter().find(|u| url::Url::parse(u).is_err()) {
            return Err(Error::Validation {
                field: "image_url",
                reason: format!("not an absolute URL: {url}"),
            });
        }
        Ok(())
    }
}

fn blank_as_null<S>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => serializer.serialize_some(v),
        _ => serializer.serialize_none(),
    }
}

// One image is stored as a bare URL, several as a JSON-encoded array string.
fn serialize_image_column<S>(urls: &[String], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match urls {
        [] => serializer.serialize_none(),
        [single] => serializer.serialize_str(single),
        many => {
            let encoded = serde_json::to_string(many).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&encoded)
        }
    }
}

/// Coarse-grained export progress, reported to the caller's callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportProgress {
    /// Normalizing records and building the summary
    Preparing,
    /// Image downloads under way
    Downloading {
        /// Downloads settled so far (success or placeholder)
        completed: usize,
        /// Total downloads queued
        total: usize,
    },
    /// Building the compressed archive
    Compressing,
    /// Archive delivered to the sink
    Done,
}

impl std::fmt::Display for ExportProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportProgress::Preparing => f.write_str("Preparing data..."),
            ExportProgress::Downloading { completed, total } => {
                write!(f, "Downloading images ({completed}/{total})...")
            }
            ExportProgress::Compressing => f.write_str("Compressing files..."),
            ExportProgress::Done => f.write_str("Done!"),
        }
    }
}

/// Summary of a finished export
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Filename handed to the save sink
    pub filename: String,
    /// Rows written to the summary
    pub records: usize,
    /// Image downloads queued
    pub images_total: usize,
    /// Images stored successfully
    pub images_downloaded: usize,
    /// Images replaced by `.error.txt` placeholders
    pub images_failed: usize,
    /// Size of the compressed archive in bytes
    pub archive_bytes: usize,
}
