//! Tabular summary: a single-sheet workbook with one row per tribute.

use rust_xlsxwriter::{Format, Workbook};

use super::plan::SummaryRow;
use crate::error::ExportError;

/// Header row, in column order
pub const SUMMARY_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Message",
    "Relationship",
    "CreatedAt",
    "Images",
    "OriginalImageURLs",
];

/// Largest string a single worksheet cell can hold
const MAX_CELL_CHARS: usize = 32_767;

/// Serialize `rows` into an in-memory `.xlsx` workbook
///
/// Overlong cells are truncated rather than failing the export.
pub fn build_workbook(rows: &[SummaryRow], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name)?;

        for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(i + 1).map_err(|_| ExportError::Summary {
                reason: format!("too many rows: {}", rows.len()),
            })?;
            for (col, value) in row.cells().iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                worksheet.write_string(row_num, col as u16, clamp_cell(value))?;
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    tracing::debug!(rows = rows.len(), bytes = buffer.len(), "summary workbook built");
    Ok(buffer)
}

fn clamp_cell(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}
