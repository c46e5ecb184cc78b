//! Boundary Tests for xlsxmd
//!
//! Limits and cancellation: sheet count, cells per sheet, deadlines and
//! caller-initiated aborts.

use rust_xlsxwriter::*;
use std::time::{Duration, Instant};
use xlsxmd::{
    convert, convert_workbook, CalamineWorkbook, Cancellation, ConversionOptions, ConvertError,
    ConverterBuilder, NoopObserver,
};

// Helper module for generating boundary test fixtures
mod fixtures {
    use super::*;

    /// Generate a workbook with `count` single-cell sheets
    pub fn generate_sheets(count: usize) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        for i in 0..count {
            let sheet = workbook.add_worksheet();
            sheet.set_name(format!("S{}", i + 1))?;
            sheet.write_string(0, 0, "v")?;
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a `rows` x `cols` sheet followed by a small sheet
    pub fn generate_big_and_small(rows: u32, cols: u16) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let big = workbook.add_worksheet();
        big.set_name("Big")?;
        for row in 0..rows {
            for col in 0..cols {
                big.write_number(row, col, (row * cols as u32 + col as u32) as f64)?;
            }
        }

        let small = workbook.add_worksheet();
        small.set_name("Small")?;
        small.write_string(0, 0, "ok")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a sheet whose rows have trailing whitespace-only cells
    pub fn generate_trailing_blanks() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "a")?;
        sheet.write_string(0, 1, "b")?;
        sheet.write_string(0, 2, "   ")?;
        sheet.write_string(1, 0, "c")?;
        sheet.write_string(2, 0, " ")?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a sheet with A1, B1 and one cell far from the origin
    pub fn generate_far_cell(row: u32, col: u16) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "a")?;
        sheet.write_string(0, 1, "b")?;
        sheet.write_string(row, col, "far")?;
        Ok(workbook.save_to_buffer()?)
    }
}

#[test]
fn test_too_many_sheets_is_fatal() {
    let converter = ConverterBuilder::new().with_max_sheets(2).build().unwrap();
    let excel_data = fixtures::generate_sheets(3).unwrap();

    match converter.convert(&excel_data) {
        Err(ConvertError::TooManySheets { count, limit }) => {
            assert_eq!(count, 3);
            assert_eq!(limit, 2);
        }
        other => panic!("Expected TooManySheets, got {:?}", other),
    }
}

#[test]
fn test_sheet_count_at_limit_is_accepted() {
    let converter = ConverterBuilder::new().with_max_sheets(3).build().unwrap();
    let excel_data = fixtures::generate_sheets(3).unwrap();

    let result = converter.convert(&excel_data).unwrap();
    assert_eq!(result.meta.processed, 3);
}

#[test]
fn test_zero_max_sheets_is_unlimited() {
    let converter = ConverterBuilder::new().with_max_sheets(0).build().unwrap();
    let excel_data = fixtures::generate_sheets(60).unwrap();

    let result = converter.convert(&excel_data).unwrap();
    assert_eq!(result.meta.sheet_count, 60);
    assert_eq!(result.meta.processed, 60);
}

#[test]
fn test_default_sheet_limit_rejects_51_sheets() {
    let converter = ConverterBuilder::new().build().unwrap();
    let excel_data = fixtures::generate_sheets(51).unwrap();

    assert!(matches!(
        converter.convert(&excel_data),
        Err(ConvertError::TooManySheets { count: 51, limit: 50 })
    ));
}

#[test]
fn test_cell_limit_isolated_to_sheet() {
    // 4 x 3 = 12 cells in "Big"
    let converter = ConverterBuilder::new()
        .with_max_cells_per_sheet(10)
        .build()
        .unwrap();
    let excel_data = fixtures::generate_big_and_small(4, 3).unwrap();

    let result = converter.convert(&excel_data).unwrap();

    let big = &result.sheets[0];
    assert_eq!(big.error.as_deref(), Some("sheet exceeds cell limit"));
    assert!(big.markdown.is_none());
    // 4th row pushes the count from 9 to 12
    assert_eq!((big.row_count, big.col_count), (4, 3));

    let small = &result.sheets[1];
    assert!(small.error.is_none());
    assert_eq!(small.markdown.as_deref(), Some("| ok |\n| --- |"));

    assert!(result
        .combined_markdown
        .starts_with("## Big\n> Error: sheet exceeds cell limit\n\n## Small\n"));
}

#[test]
fn test_cell_limit_exactly_reached_is_accepted() {
    let converter = ConverterBuilder::new()
        .with_max_cells_per_sheet(12)
        .build()
        .unwrap();
    let excel_data = fixtures::generate_big_and_small(4, 3).unwrap();

    let result = converter.convert(&excel_data).unwrap();
    assert!(result.sheets[0].error.is_none());
    assert_eq!(result.sheets[0].row_count, 4);
}

#[test]
fn test_zero_cell_limit_is_unlimited() {
    let converter = ConverterBuilder::new()
        .with_max_cells_per_sheet(0)
        .build()
        .unwrap();
    let excel_data = fixtures::generate_big_and_small(200, 10).unwrap();

    let result = converter.convert(&excel_data).unwrap();
    assert!(result.sheets[0].error.is_none());
    assert_eq!(result.sheets[0].row_count, 200);
    assert_eq!(result.sheets[0].col_count, 10);
}

#[test]
fn test_trailing_whitespace_cells_not_counted() {
    // Trimmed cell count is 2 + 1 = 3
    let converter = ConverterBuilder::new()
        .with_max_cells_per_sheet(3)
        .build()
        .unwrap();
    let excel_data = fixtures::generate_trailing_blanks().unwrap();

    let result = converter.convert(&excel_data).unwrap();
    let sheet = &result.sheets[0];
    assert!(sheet.error.is_none());
    assert_eq!(
        sheet.markdown.as_deref(),
        Some("| a | b |\n| --- | --- |\n| c |  |")
    );
}

#[test]
fn test_far_cell_does_not_expand_sheet_before_limit() {
    // The bounding box spans more than 16 billion cells
    let converter = ConverterBuilder::new()
        .with_max_cells_per_sheet(1)
        .build()
        .unwrap();
    let excel_data = fixtures::generate_far_cell(1_000_000, 16_000).unwrap();

    let result = converter.convert(&excel_data).unwrap();

    let sheet = &result.sheets[0];
    assert_eq!(sheet.error.as_deref(), Some("sheet exceeds cell limit"));
    assert_eq!((sheet.row_count, sheet.col_count), (1, 0));
}

#[test]
fn test_far_cell_within_limit_is_anchored() {
    let converter = ConverterBuilder::new().build().unwrap();
    let excel_data = fixtures::generate_far_cell(4, 3).unwrap();

    let result = converter.convert(&excel_data).unwrap();

    let sheet = &result.sheets[0];
    assert!(sheet.error.is_none());
    assert_eq!((sheet.row_count, sheet.col_count), (5, 4));
    assert!(sheet
        .markdown
        .as_deref()
        .unwrap()
        .ends_with("|  |  |  | far |"));
}

#[test]
fn test_expired_token_fails_with_timeout() {
    let excel_data = fixtures::generate_sheets(1).unwrap();
    let cancel = Cancellation::with_deadline(Instant::now());

    let error = convert(&excel_data, &ConversionOptions::default(), &cancel).unwrap_err();

    assert!(matches!(error, ConvertError::Timeout));
    assert_eq!(error.to_string(), "conversion timed out");
}

#[test]
fn test_caller_cancel_is_distinct_from_timeout() {
    let excel_data = fixtures::generate_sheets(1).unwrap();
    let cancel = Cancellation::with_timeout(Duration::from_secs(60));
    cancel.cancel("request aborted");

    let error = convert(&excel_data, &ConversionOptions::default(), &cancel).unwrap_err();

    match error {
        ConvertError::Cancelled(reason) => assert_eq!(reason, "request aborted"),
        other => panic!("Expected Cancelled, got {:?}", other),
    }
}

#[test]
fn test_cancel_after_open_stops_before_first_sheet() {
    let excel_data = fixtures::generate_sheets(2).unwrap();
    let mut workbook = CalamineWorkbook::open(std::io::Cursor::new(excel_data)).unwrap();
    let cancel = Cancellation::new();
    cancel.cancel("shutdown");

    let error = convert_workbook(
        &mut workbook,
        &ConversionOptions::default(),
        &cancel,
        &NoopObserver,
    )
    .unwrap_err();

    assert!(error.is_cancellation());
}

#[test]
fn test_converter_with_cancellation_token() {
    let converter = ConverterBuilder::new().build().unwrap();
    let excel_data = fixtures::generate_sheets(1).unwrap();

    let cancel = Cancellation::new();
    assert!(converter
        .convert_with_cancellation(&excel_data, &cancel)
        .is_ok());

    cancel.cancel("stop");
    assert!(matches!(
        converter.convert_with_cancellation(&excel_data, &cancel),
        Err(ConvertError::Cancelled(_))
    ));
}
