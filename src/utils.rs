//! Naming and formatting helpers shared by the exporter and gallery

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc};

use crate::config::{DisplayConfig, is_plain_extension};

/// Offset between the Gregorian and Buddhist calendars
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Abbreviated Thai month names, January first
const THAI_MONTHS_SHORT: [&str; 12] = [
    "ม.ค.", "ก.พ.", "มี.ค.", "เม.ย.", "พ.ค.", "มิ.ย.", "ก.ค.", "ส.ค.", "ก.ย.", "ต.ค.", "พ.ย.",
    "ธ.ค.",
];

/// Derive a file extension from an image URL
///
/// Uses the suffix of the last path segment, ignoring query string and fragment.
/// The suffix keeps its case. Returns `fallback` when the URL does not parse or the suffix is missing or
/// not a short alphanumeric token.
///
/// # Examples
///
/// ```
/// use tribute_archive::utils::extension_from_url;
///
/// assert_eq!(extension_from_url("https://cdn.example/a/photo.PNG?w=600", "jpg"), "PNG");
/// assert_eq!(extension_from_url("https://cdn.example/a/photo", "jpg"), "jpg");
/// ```
pub fn extension_from_url(raw: &str, fallback: &str) -> String {
    let Ok(url) = url::Url::parse(raw) else {
        return fallback.to_string();
    };
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| is_plain_extension(ext))
        .map_or_else(|| fallback.to_string(), str::to_string)
}

/// Archive entry name for the `image_index`-th image of the `record_index`-th record
///
/// Both indices are zero-based; the name uses one-based ordinals. The name depends
/// only on positions and the extension, so two records can never collide.
pub fn image_target_name(record_index: usize, image_index: usize, extension: &str) -> String {
    format!("image_{}_{}.{}", record_index + 1, image_index + 1, extension)
}

/// Filename of the delivered archive, e.g. `tributes_archive_2026-10-19.zip`
pub fn archive_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.zip", prefix, date.format("%Y-%m-%d"))
}

fn to_display_zone(ts: DateTime<Utc>, display: &DisplayConfig) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(display.utc_offset_minutes * 60)
        .unwrap_or_else(|| Utc.fix());
    ts.with_timezone(&offset)
}

fn display_year(year: i32, display: &DisplayConfig) -> i32 {
    if display.buddhist_era {
        year + BUDDHIST_ERA_OFFSET
    } else {
        year
    }
}

/// Render a timestamp the way a Thai-locale date-time string looks: `d/m/yyyy HH:MM:SS`
pub fn format_timestamp(ts: DateTime<Utc>, display: &DisplayConfig) -> String {
    let local = to_display_zone(ts, display);
    format!(
        "{}/{}/{} {:02}:{:02}:{:02}",
        local.day(),
        local.month(),
        display_year(local.year(), display),
        local.hour(),
        local.minute(),
        local.second()
    )
}

/// Render a short card date, e.g. `19 ต.ค. 2569`
pub fn format_card_date(ts: DateTime<Utc>, display: &DisplayConfig) -> String {
    let local = to_display_zone(ts, display);
    format!(
        "{} {} {}",
        local.day(),
        THAI_MONTHS_SHORT[local.month0() as usize],
        display_year(local.year(), display)
    )
}
