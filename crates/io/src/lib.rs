// File I/O: decoding uploads into a RawGrid and writing reports

pub mod cache;
pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::Path;

use supsum_pipeline::RawGrid;

pub use cache::SheetCache;
pub use error::{ExportError, IngestError};
pub use xlsx::{report_to_bytes, write_report, REPORT_FILE_NAME, REPORT_MIME_TYPE};

/// Input container kinds, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Anything calamine opens: xlsx, xlsm, xls, xlsb, ods.
    Workbook,
    Csv,
    Tsv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            _ => Err(IngestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Decode raw file bytes into a grid.
pub fn decode(bytes: &[u8], format: InputFormat) -> Result<RawGrid, IngestError> {
    match format {
        InputFormat::Workbook => xlsx::import_bytes(bytes),
        InputFormat::Csv => csv::import_bytes(bytes, None),
        InputFormat::Tsv => csv::import_bytes(bytes, Some(b'\t')),
    }
}
