use chrono::{TimeZone, Utc};
use rust_xlsxwriter::Workbook;

use postbox::models::ContactSubmission;
use postbox::workbook;

fn submission(name: &str) -> ContactSubmission {
    ContactSubmission {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        subject: "Subject".to_string(),
        message: "Message, with a comma".to_string(),
        submitted_at: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
    }
}

#[test]
fn roundtrip_preserves_rows() {
    let rows = vec![submission("Alice"), submission("Bob")];

    let bytes = workbook::encode(&rows).unwrap();
    let decoded = workbook::decode(&bytes).unwrap();

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].name, "Alice");
    assert_eq!(decoded[0].email, "alice@example.com");
    assert_eq!(decoded[1].message, "Message, with a comma");
    assert_eq!(decoded[1].submitted_at, rows[1].submitted_at);
}

#[test]
fn missing_timestamp_decodes_as_none() {
    let mut row = submission("Alice");
    row.submitted_at = None;

    let bytes = workbook::encode(&[row]).unwrap();
    let decoded = workbook::decode(&bytes).unwrap();
    assert_eq!(decoded[0].submitted_at, None);
}

#[test]
fn decode_tolerates_missing_columns() {
    // A workbook written before some columns existed: rows decode with the
    // absent columns empty.
    let mut wb = Workbook::new();
    let sheet = wb.add_worksheet();
    sheet.set_name("Submissions").unwrap();
    for (col, header) in ["name", "email", "timestamp"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "Old").unwrap();
    sheet.write_string(1, 1, "old@example.com").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let decoded = workbook::decode(&bytes).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "Old");
    assert_eq!(decoded[0].subject, "");
    assert_eq!(decoded[0].message, "");
    assert_eq!(decoded[0].submitted_at, None);
}

#[test]
fn decode_reads_first_sheet_regardless_of_name() {
    // Hand-edited workbooks may have a renamed sheet; first sheet wins.
    let mut wb = Workbook::new();
    let sheet = wb.add_worksheet();
    sheet.set_name("Renamed").unwrap();
    for (col, header) in ["name", "email", "subject", "message", "timestamp"]
        .iter()
        .enumerate()
    {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    sheet.write_string(1, 0, "Carol").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let decoded = workbook::decode(&bytes).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].name, "Carol");
}

#[test]
fn decode_rejects_garbage() {
    assert!(workbook::decode(b"definitely not an xlsx file").is_err());
}

#[test]
fn empty_workbook_encodes_header_only() {
    let bytes = workbook::encode(&[]).unwrap();
    let decoded = workbook::decode(&bytes).unwrap();
    assert!(decoded.is_empty());
}
