use crate::error::PipelineError;
use crate::model::{canonical_label, Field, HeaderLabels, HeaderRow, RawGrid};

/// Find the first row containing both the supplier and amount labels.
///
/// Scans top to bottom and stops at the first match; rows below it are
/// never considered, even if they also qualify.
pub fn locate(grid: &RawGrid, labels: &HeaderLabels) -> Result<HeaderRow, PipelineError> {
    let supplier = labels.label(Field::SupplierName);
    let amount = labels.label(Field::TotalAmount);

    for (idx, row) in grid.rows.iter().enumerate() {
        let rendered: Vec<String> = row.iter().map(|c| canonical_label(&c.to_text())).collect();
        if rendered.contains(&supplier) && rendered.contains(&amount) {
            log::debug!("header row found at index {idx}");
            return Ok(HeaderRow(idx));
        }
    }

    Err(PipelineError::HeaderNotFound { supplier_label: supplier, amount_label: amount })
}
