use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::Workbook;

use crate::models::ContactSubmission;
use crate::storage::StorageError;

pub const SHEET_NAME: &str = "Submissions";

const HEADERS: [&str; 5] = ["name", "email", "subject", "message", "timestamp"];

/// Parse workbook bytes back into submission rows.
///
/// Columns are matched by header name, so a workbook written before a
/// column existed still decodes (the missing column reads as empty). The
/// first sheet is used regardless of its name; newly written workbooks
/// always carry the `Submissions` sheet.
pub fn decode(bytes: &[u8]) -> Result<Vec<ContactSubmission>, StorageError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| StorageError::Workbook(format!("Failed to open workbook: {e}")))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| StorageError::Workbook("Workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| StorageError::Workbook(format!("Failed to read sheet '{sheet}': {e}")))?;

    let mut rows = range.rows();

    let header_row = match rows.next() {
        Some(row) => row,
        None => return Ok(Vec::new()),
    };

    let col_of = |name: &str| {
        header_row
            .iter()
            .position(|cell| cell_to_string(cell) == name)
    };

    let cols: Vec<Option<usize>> = HEADERS.iter().map(|h| col_of(h)).collect();

    let mut submissions = Vec::new();
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }

        let field = |idx: usize| {
            cols[idx]
                .and_then(|c| row.get(c))
                .map(cell_to_string)
                .unwrap_or_default()
        };

        submissions.push(ContactSubmission {
            name: field(0),
            email: field(1),
            subject: field(2),
            message: field(3),
            submitted_at: parse_timestamp(&field(4)),
        });
    }

    Ok(submissions)
}

/// Serialize submission rows into a single-sheet xlsx workbook.
pub fn encode(rows: &[ContactSubmission]) -> Result<Vec<u8>, StorageError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(SHEET_NAME)
        .map_err(|e| StorageError::Workbook(format!("Failed to name sheet: {e}")))?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *header)
            .map_err(|e| StorageError::Workbook(format!("Failed to write header: {e}")))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let timestamp = row
            .submitted_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let cells = [
            row.name.as_str(),
            row.email.as_str(),
            row.subject.as_str(),
            row.message.as_str(),
            timestamp.as_str(),
        ];
        for (col, value) in cells.iter().enumerate() {
            sheet
                .write_string(r, col as u16, *value)
                .map_err(|e| StorageError::Workbook(format!("Failed to write row {r}: {e}")))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| StorageError::Workbook(format!("Failed to serialize workbook: {e}")))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
