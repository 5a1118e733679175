use serde::Serialize;

use crate::model::{LogicalRecord, TotalRecord};

/// Presentation style shared by the terminal table and the xlsx report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    /// Column titles: bold, centered.
    Header,
    /// Aggregate row: bold with a gray fill on every cell.
    Total,
    Plain,
}

/// Gray fill used for `StyleTag::Total` rows (RGB).
pub const TOTAL_FILL_RGB: u32 = 0xD9D9D9;

/// Style for a data row, decided from its first cell's content.
///
/// Any row whose first cell reads `TOTAL` is styled as the total, including
/// a supplier that happens to be named "Total".
pub fn style_for(first_cell: &str) -> StyleTag {
    if first_cell.trim().to_uppercase() == TotalRecord::LABEL {
        StyleTag::Total
    } else {
        StyleTag::Plain
    }
}

pub fn style_for_record(record: &LogicalRecord) -> StyleTag {
    style_for(&record.supplier_name)
}
