// Excel import (xlsx, xls, xlsb, ods) and report export (xlsx only)
//
// Import: first worksheet only, decoded into a RawGrid of Text/Number/Blank.
// Export: the styled supplier summary built by supsum-pipeline.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatPattern, Workbook, Worksheet};
use supsum_pipeline::report::{ReportDocument, ReportValue, AMOUNT_NUM_FORMAT};
use supsum_pipeline::style::TOTAL_FILL_RGB;
use supsum_pipeline::{Cell, RawGrid, StyleTag};

use crate::error::{ExportError, IngestError};

/// Download name for the exported report.
pub const REPORT_FILE_NAME: &str = "Supplier_Summary.xlsx";

pub const REPORT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Worksheet name used in the exported report.
pub const REPORT_SHEET_NAME: &str = "Supplier Summary";

/// Maximum dimensions read from a sheet
const MAX_ROWS: usize = 65536;
const MAX_COLS: usize = 256;

// ============================================================================
// Import
// ============================================================================

/// Decode workbook bytes into the grid of the first worksheet.
pub fn import_bytes(bytes: &[u8]) -> Result<RawGrid, IngestError> {
    let mut workbook: Sheets<_> = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestError::Decode(format!("failed to open Excel file: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Decode(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(RawGrid::default());
    }

    // Range start offset (data may not begin at A1). Leading rows and
    // columns are kept as blanks so indices match the sheet.
    let (start_row, start_col) = range.start().map(|(r, c)| (r as usize, c as usize)).unwrap_or((0, 0));

    if start_row + height > MAX_ROWS || start_col + width > MAX_COLS {
        log::warn!(
            "sheet '{}' truncated from {}x{} to at most {}x{}",
            sheet_name,
            start_row + height,
            start_col + width,
            MAX_ROWS,
            MAX_COLS
        );
    }

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row.min(MAX_ROWS)];
    for row in range.rows() {
        if rows.len() >= MAX_ROWS {
            break;
        }
        let mut cells = vec![Cell::Blank; start_col.min(MAX_COLS)];
        for data in row {
            if cells.len() >= MAX_COLS {
                break;
            }
            cells.push(convert_cell(data));
        }
        rows.push(cells);
    }

    log::debug!("decoded sheet '{}': {} rows", sheet_name, rows.len());
    Ok(RawGrid::new(rows))
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Blank,
        Data::String(s) if s.is_empty() => Cell::Blank,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(_) => Cell::Text("#ERR".to_string()),
        // Dates keep their serial value; no procurement field is a date.
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

// ============================================================================
// Export
// ============================================================================

/// Write the report to `path` as xlsx.
pub fn write_report(doc: &ReportDocument, path: &Path) -> Result<(), ExportError> {
    let mut workbook = build_workbook(doc)?;
    workbook.save(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    log::info!("wrote {} rows to {}", doc.rows.len(), path.display());
    Ok(())
}

/// Serialize the report to in-memory xlsx bytes (for download).
pub fn report_to_bytes(doc: &ReportDocument) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(doc)?;
    workbook
        .save_to_buffer()
        .map_err(|e| ExportError::Xlsx(e.to_string()))
}

fn build_workbook(doc: &ReportDocument) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(REPORT_SHEET_NAME)
        .map_err(|e| ExportError::Xlsx(format!("failed to create sheet: {}", e)))?;

    write_rows(worksheet, doc)?;

    for (col, width) in doc.column_widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width as f64)
            .map_err(|e| ExportError::Xlsx(format!("failed to set column {} width: {}", col, e)))?;
    }

    Ok(workbook)
}

fn write_rows(worksheet: &mut Worksheet, doc: &ReportDocument) -> Result<(), ExportError> {
    let cell_err = |row: usize, col: usize, e: rust_xlsxwriter::XlsxError| {
        ExportError::Xlsx(format!("failed to write cell ({}, {}): {}", row, col, e))
    };

    for (row_idx, row) in doc.rows.iter().enumerate() {
        let r = row_idx as u32;
        for (col_idx, cell) in row.cells.iter().enumerate() {
            let c = col_idx as u16;
            match &cell.value {
                ReportValue::Text { text } => {
                    worksheet
                        .write_string_with_format(r, c, text, &text_format(cell.style))
                        .map_err(|e| cell_err(row_idx, col_idx, e))?;
                }
                ReportValue::Number { value, display } => {
                    match value.to_f64() {
                        Some(n) => worksheet
                            .write_number_with_format(r, c, n, &amount_format(cell.style))
                            .map_err(|e| cell_err(row_idx, col_idx, e))?,
                        None => worksheet
                            .write_string_with_format(r, c, display, &text_format(cell.style))
                            .map_err(|e| cell_err(row_idx, col_idx, e))?,
                    };
                }
                ReportValue::Empty => {
                    // Plain blanks stay unwritten; styled ones need the fill.
                    if cell.style != StyleTag::Plain {
                        worksheet
                            .write_blank(r, c, &text_format(cell.style))
                            .map_err(|e| cell_err(row_idx, col_idx, e))?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Excel format for a style tag.
fn text_format(style: StyleTag) -> Format {
    match style {
        StyleTag::Header => Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter),
        StyleTag::Total => Format::new()
            .set_bold()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(TOTAL_FILL_RGB)),
        StyleTag::Plain => Format::new(),
    }
}

fn amount_format(style: StyleTag) -> Format {
    text_format(style).set_num_format(AMOUNT_NUM_FORMAT)
}
