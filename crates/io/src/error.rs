use std::fmt;

/// The upload could not be turned into a grid.
#[derive(Debug)]
pub enum IngestError {
    /// File could not be read.
    Io { path: String, message: String },
    /// Extension is not a supported spreadsheet format.
    UnsupportedFormat(String),
    /// Bytes are not a valid spreadsheet of the expected kind.
    Decode(String),
    /// Workbook opened but has no worksheets.
    NoSheets,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported file type: {path} (expected xlsx, xls, xlsb, ods, csv or tsv)")
            }
            Self::Decode(msg) => write!(f, "error processing file: {msg}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
        }
    }
}

impl std::error::Error for IngestError {}

/// The report could not be serialized or saved.
#[derive(Debug)]
pub enum ExportError {
    Xlsx(String),
    Io { path: String, message: String },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xlsx(msg) => write!(f, "failed to build xlsx report: {msg}"),
            Self::Io { path, message } => write!(f, "cannot write {path}: {message}"),
        }
    }
}

impl std::error::Error for ExportError {}
