use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input grid
// ---------------------------------------------------------------------------

/// A single decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// Render the cell as text. Blank renders as the empty string.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Blank => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Integers print without a fraction, everything else in shortest round-trip form.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Rows of cells exactly as decoded from the uploaded sheet, 0-indexed.
///
/// Rows may be ragged; positions past the end of a row read as `Blank`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    pub rows: Vec<Vec<Cell>>,
}

static BLANK: Cell = Cell::Blank;

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&BLANK)
    }
}

// ---------------------------------------------------------------------------
// Header + columns
// ---------------------------------------------------------------------------

/// Index of the header row within a `RawGrid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderRow(pub usize);

/// Logical fields the pipeline maps onto physical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    SupplierName,
    TaxId,
    TotalAmount,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::SupplierName, Field::TaxId, Field::TotalAmount];

    /// Column title used in displayed and exported reports.
    pub fn title(&self) -> &'static str {
        match self {
            Self::SupplierName => "Supplier Name",
            Self::TaxId => "TIN",
            Self::TotalAmount => "Total Amount Paid",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SupplierName => write!(f, "supplier_name"),
            Self::TaxId => write!(f, "tax_id"),
            Self::TotalAmount => write!(f, "total_amount"),
        }
    }
}

/// Header labels searched for in the upload. Compared trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLabels {
    pub supplier_name: String,
    pub tax_id: String,
    pub total_amount: String,
    /// When set, a missing tax id label also requires manual resolution.
    pub require_tax_id: bool,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            supplier_name: "NAME OF SUPPLIERS".into(),
            tax_id: "TIN".into(),
            total_amount: "TOTAL AMOUNT PAID".into(),
            require_tax_id: false,
        }
    }
}

impl HeaderLabels {
    pub fn label(&self, field: Field) -> String {
        let raw = match field {
            Field::SupplierName => &self.supplier_name,
            Field::TaxId => &self.tax_id,
            Field::TotalAmount => &self.total_amount,
        };
        canonical_label(raw)
    }
}

/// Trim and upper-case a header cell for comparison.
pub fn canonical_label(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Field → column index. `tax_id` may be intentionally unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub supplier_name: usize,
    pub tax_id: Option<usize>,
    pub total_amount: usize,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One cleaned supplier row. Identity is positional; duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalRecord {
    pub supplier_name: String,
    pub tax_id: String,
    pub normalized_tax_id: String,
    pub total_amount: Option<Decimal>,
}

impl LogicalRecord {
    pub fn new(supplier_name: impl Into<String>, tax_id: impl Into<String>, total_amount: Option<Decimal>) -> Self {
        let tax_id = tax_id.into();
        Self {
            supplier_name: supplier_name.into(),
            normalized_tax_id: normalize_tax_id(&tax_id),
            tax_id,
            total_amount,
        }
    }
}

/// Keep letters and digits only, lower-cased. `"TIN-00 123"` → `"tin00123"`.
pub fn normalize_tax_id(tax_id: &str) -> String {
    tax_id
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Synthetic aggregate row appended after the records it summarizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TotalRecord {
    pub total_amount: Decimal,
}

impl TotalRecord {
    pub const LABEL: &'static str = "TOTAL";

    pub fn to_record(&self) -> LogicalRecord {
        LogicalRecord::new(Self::LABEL, "", Some(self.total_amount))
    }
}
