//! Normalization pass: one summary row per record and one download task per image.

use crate::config::Config;
use crate::types::TributeRecord;
use crate::utils::{extension_from_url, format_timestamp, image_target_name};

/// One image to fetch and where its bytes land inside the archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    /// URL to fetch
    pub source_url: String,
    /// Entry name under the images directory
    pub target_name: String,
}

impl DownloadTask {
    /// Entry name of the placeholder written when the fetch fails
    pub fn placeholder_name(&self) -> String {
        format!("{}.error.txt", self.target_name)
    }
}

/// One row of the tabular summary
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SummaryRow {
    /// Record identifier
    pub id: String,
    /// Author name
    pub name: String,
    /// Message body (canonical field preferred)
    pub message: String,
    /// Relationship label, empty when absent
    pub relationship: String,
    /// Locale-formatted creation time, empty when missing
    pub created_at: String,
    /// Comma-joined archive entry names of the record's images
    pub images: String,
    /// Comma-joined source URLs of the record's images
    pub original_image_urls: String,
}

impl SummaryRow {
    /// Cell values in column order
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.id,
            &self.name,
            &self.message,
            &self.relationship,
            &self.created_at,
            &self.images,
            &self.original_image_urls,
        ]
    }
}

/// Everything the download and summary stages need, derived from the input
#[derive(Clone, Debug, Default)]
pub struct ExportPlan {
    /// Summary rows, in input order
    pub rows: Vec<SummaryRow>,
    /// Download tasks, in input order then image order
    pub downloads: Vec<DownloadTask>,
}

/// Build the export plan for `records`
///
/// Target names depend only on the record's and image's positions, so they are
/// unique across the export even when records share source URLs.
pub fn plan_export(records: &[TributeRecord], config: &Config) -> ExportPlan {
    let fallback = &config.export.fallback_extension;
    let mut plan = ExportPlan {
        rows: Vec::with_capacity(records.len()),
        downloads: Vec::new(),
    };

    for (record_index, record) in records.iter().enumerate() {
        let mut target_names = Vec::with_capacity(record.image_urls.len());

        for (image_index, url) in record.image_urls.iter().enumerate() {
            let extension = extension_from_url(url, fallback);
            let target_name = image_target_name(record_index, image_index, &extension);
            target_names.push(target_name.clone());
            plan.downloads.push(DownloadTask {
                source_url: url.clone(),
                target_name,
            });
        }

        plan.rows.push(SummaryRow {
            id: record.id.to_string(),
            name: record.name.clone(),
            message: record.body().to_string(),
            relationship: record.relationship.clone().unwrap_or_default(),
            created_at: record
                .created_at
                .map(|ts| format_timestamp(ts, &config.display))
                .unwrap_or_default(),
            images: target_names.join(", "),
            original_image_urls: record.image_urls.as_slice().join(", "),
        });
    }

    tracing::debug!(
        records = plan.rows.len(),
        downloads = plan.downloads.len(),
        "export plan built"
    );
    plan
}
