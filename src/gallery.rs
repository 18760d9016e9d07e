//! Gallery helpers for listing tributes
//!
//! These mirror how the tribute wall presents records: a tab filter, a photo
//! counter, newest-first ordering and the choice between a standard card and a
//! compact quote card. Nothing here is consulted by the exporter.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;
use crate::types::TributeRecord;
use crate::utils::format_card_date;

/// Messages shorter than this (in characters) qualify for a quote card
pub const QUOTE_MAX_CHARS: usize = 100;

/// Gallery tab
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryFilter {
    /// Every tribute, with images
    #[default]
    All,
    /// Only tributes carrying at least one image
    Photo,
    /// Guestbook view: every tribute, images hidden
    Text,
}

impl GalleryFilter {
    /// Whether `record` is listed under this tab
    pub fn matches(self, record: &TributeRecord) -> bool {
        match self {
            GalleryFilter::Photo => record.has_images(),
            GalleryFilter::All | GalleryFilter::Text => true,
        }
    }

    /// Whether cards under this tab display images at all
    pub fn shows_images(self) -> bool {
        !matches!(self, GalleryFilter::Text)
    }

    /// Records listed under this tab, in input order
    pub fn apply<'a>(self, records: &'a [TributeRecord]) -> Vec<&'a TributeRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Number of records with at least one image
pub fn photo_count(records: &[TributeRecord]) -> usize {
    records.iter().filter(|r| r.has_images()).count()
}

/// Order records newest first, ties keeping input order
///
/// Undated records lead the list, matching the store's descending order where
/// nulls sort first.
pub fn sort_newest_first(records: &mut [TributeRecord]) {
    records.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Visual style of a gallery card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStyle {
    /// Image (when shown) above the message
    Standard,
    /// Large quoted text, used for short text-only cards
    Quote,
}

impl CardStyle {
    /// Pick the card style for `record` under `filter`
    ///
    /// Only the canonical `messages` field is measured; a record with just the
    /// legacy `message` field always gets a standard card.
    pub fn for_record(record: &TributeRecord, filter: GalleryFilter) -> Self {
        let shows_image = filter.shows_images() && record.has_images();
        let short = record
            .messages
            .as_deref()
            .is_some_and(|m| m.chars().count() < QUOTE_MAX_CHARS);

        if !shows_image && short {
            CardStyle::Quote
        } else {
            CardStyle::Standard
        }
    }
}

/// Short Thai date for a card, `None` when the record is undated
pub fn card_date(record: &TributeRecord, display: &DisplayConfig) -> Option<String> {
    record.created_at.map(|ts| format_card_date(ts, display))
}
