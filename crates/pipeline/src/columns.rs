use std::str::FromStr;

use serde::Serialize;

use crate::error::PipelineError;
use crate::model::{canonical_label, ColumnMap, Field, HeaderLabels, HeaderRow, RawGrid};

/// Outcome of automatic column resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ColumnMap),
    NeedsManualInput(ManualSelection),
}

/// Everything a caller needs to ask for a manual mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualSelection {
    /// Header labels in column order, trimmed and upper-cased.
    pub labels: Vec<String>,
    /// Fields that could not be matched automatically.
    pub missing: Vec<Field>,
    /// Whether the tax id may be left unmapped.
    pub tax_id_optional: bool,
}

/// Header row cells as column labels, one per grid column.
pub fn column_labels(grid: &RawGrid, header: HeaderRow) -> Vec<String> {
    (0..grid.width())
        .map(|col| canonical_label(&grid.cell(header.0, col).to_text()))
        .collect()
}

/// Map the logical fields onto columns by exact label match.
///
/// The tax id is looked up the same way but its absence only blocks
/// resolution when `labels.require_tax_id` is set.
pub fn resolve(grid: &RawGrid, header: HeaderRow, labels: &HeaderLabels) -> Resolution {
    let available = column_labels(grid, header);
    let find = |field: Field| {
        let wanted = labels.label(field);
        available.iter().position(|l| *l == wanted)
    };

    let supplier = find(Field::SupplierName);
    let tax_id = find(Field::TaxId);
    let amount = find(Field::TotalAmount);

    let mut missing = Vec::new();
    if supplier.is_none() {
        missing.push(Field::SupplierName);
    }
    if tax_id.is_none() && labels.require_tax_id {
        missing.push(Field::TaxId);
    }
    if amount.is_none() {
        missing.push(Field::TotalAmount);
    }

    match (supplier, amount) {
        (Some(supplier_name), Some(total_amount)) if missing.is_empty() => {
            Resolution::Resolved(ColumnMap { supplier_name, tax_id, total_amount })
        }
        _ => {
            log::warn!("automatic column detection failed; missing {:?}", missing);
            Resolution::NeedsManualInput(ManualSelection {
                labels: available,
                missing,
                tax_id_optional: !labels.require_tax_id,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Manual override
// ---------------------------------------------------------------------------

/// A user's pick for one field: a column reference, or explicitly none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// Label, column letter, or 1-indexed number as typed by the user.
    Named(String),
    /// 0-indexed column position.
    Index(usize),
    Unmapped,
}

impl FromStr for ColumnRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("none") {
            Ok(Self::Unmapped)
        } else {
            Ok(Self::Named(trimmed.to_string()))
        }
    }
}

/// One choice per logical field, supplied by the manual-resolution caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChoices {
    pub supplier_name: ColumnRef,
    pub tax_id: ColumnRef,
    pub total_amount: ColumnRef,
}

impl ColumnChoices {
    /// Turn the choices into a fixed `ColumnMap` against `available` labels.
    pub fn to_column_map(&self, available: &[String], labels: &HeaderLabels) -> Result<ColumnMap, PipelineError> {
        let supplier_name = required(Field::SupplierName, &self.supplier_name, available)?;
        let total_amount = required(Field::TotalAmount, &self.total_amount, available)?;
        let tax_id = match &self.tax_id {
            ColumnRef::Unmapped if labels.require_tax_id => {
                return Err(PipelineError::MissingChoice(Field::TaxId));
            }
            ColumnRef::Unmapped => None,
            other => Some(required(Field::TaxId, other, available)?),
        };
        Ok(ColumnMap { supplier_name, tax_id, total_amount })
    }
}

fn required(field: Field, choice: &ColumnRef, available: &[String]) -> Result<usize, PipelineError> {
    match choice {
        ColumnRef::Named(spec) => resolve_column(field, spec, available),
        ColumnRef::Index(i) if *i < available.len() => Ok(*i),
        ColumnRef::Index(i) => Err(PipelineError::UnknownColumn {
            field,
            choice: col_letter(*i),
            available: available.to_vec(),
        }),
        ColumnRef::Unmapped => Err(PipelineError::MissingChoice(field)),
    }
}

/// Resolve a column by label (case-insensitive), letter, or 1-indexed number.
pub fn resolve_column(field: Field, spec: &str, available: &[String]) -> Result<usize, PipelineError> {
    let wanted = canonical_label(spec);
    if let Some(i) = available.iter().position(|l| *l == wanted) {
        return Ok(i);
    }

    if !wanted.is_empty() && wanted.len() <= 3 && wanted.chars().all(|c| c.is_ascii_uppercase()) {
        let col = wanted
            .bytes()
            .fold(0usize, |acc, b| acc * 26 + (b - b'A' + 1) as usize);
        if col >= 1 && col <= available.len() {
            return Ok(col - 1);
        }
    }

    if let Ok(n) = wanted.parse::<usize>() {
        if n >= 1 && n <= available.len() {
            return Ok(n - 1);
        }
    }

    Err(PipelineError::UnknownColumn {
        field,
        choice: spec.to_string(),
        available: available.to_vec(),
    })
}

/// Column letter for display (0 → A, 26 → AA).
pub fn col_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;

    fn header_grid(labels: &[&str]) -> RawGrid {
        RawGrid::new(vec![
            vec![Cell::from("Report title")],
            labels.iter().map(|s| Cell::from(*s)).collect(),
        ])
    }

    fn named(s: &str) -> ColumnRef {
        ColumnRef::Named(s.into())
    }

    #[test]
    fn resolves_all_three() {
        let g = header_grid(&["No.", " Name of Suppliers", "tin", "Total Amount Paid "]);
        let res = resolve(&g, HeaderRow(1), &HeaderLabels::default());
        assert_eq!(
            res,
            Resolution::Resolved(ColumnMap { supplier_name: 1, tax_id: Some(2), total_amount: 3 })
        );
    }

    #[test]
    fn missing_tin_is_not_blocking() {
        let g = header_grid(&["NAME OF SUPPLIERS", "TOTAL AMOUNT PAID"]);
        let res = resolve(&g, HeaderRow(1), &HeaderLabels::default());
        assert_eq!(
            res,
            Resolution::Resolved(ColumnMap { supplier_name: 0, tax_id: None, total_amount: 1 })
        );
    }

    #[test]
    fn missing_tin_blocks_when_required() {
        let g = header_grid(&["NAME OF SUPPLIERS", "TOTAL AMOUNT PAID"]);
        let labels = HeaderLabels { require_tax_id: true, ..HeaderLabels::default() };
        match resolve(&g, HeaderRow(1), &labels) {
            Resolution::NeedsManualInput(sel) => {
                assert_eq!(sel.missing, vec![Field::TaxId]);
                assert!(!sel.tax_id_optional);
            }
            other => panic!("expected manual input, got {other:?}"),
        }
    }

    #[test]
    fn missing_amount_needs_manual_input() {
        let g = header_grid(&["NAME OF SUPPLIERS", "TIN", "AMOUNT"]);
        match resolve(&g, HeaderRow(1), &HeaderLabels::default()) {
            Resolution::NeedsManualInput(sel) => {
                assert_eq!(sel.labels, vec!["NAME OF SUPPLIERS", "TIN", "AMOUNT"]);
                assert_eq!(sel.missing, vec![Field::TotalAmount]);
            }
            other => panic!("expected manual input, got {other:?}"),
        }
    }

    #[test]
    fn manual_choices_by_label_letter_and_number() {
        let available: Vec<String> = ["SUPPLIER", "TIN", "AMOUNT"].iter().map(|s| s.to_string()).collect();
        let choices = ColumnChoices {
            supplier_name: named("supplier"),
            tax_id: named("B"),
            total_amount: named("3"),
        };
        let map = choices.to_column_map(&available, &HeaderLabels::default()).unwrap();
        assert_eq!(map, ColumnMap { supplier_name: 0, tax_id: Some(1), total_amount: 2 });
    }

    #[test]
    fn manual_tax_id_none() {
        let available: Vec<String> = vec!["A1".into(), "B1".into()];
        let choices = ColumnChoices {
            supplier_name: named("A"),
            tax_id: "None".parse().unwrap(),
            total_amount: named("B"),
        };
        let map = choices.to_column_map(&available, &HeaderLabels::default()).unwrap();
        assert_eq!(map.tax_id, None);

        let strict = HeaderLabels { require_tax_id: true, ..HeaderLabels::default() };
        assert_eq!(
            choices.to_column_map(&available, &strict).unwrap_err(),
            PipelineError::MissingChoice(Field::TaxId)
        );
    }

    #[test]
    fn manual_by_index() {
        let available: Vec<String> = vec!["A1".into(), "B1".into()];
        let choices = ColumnChoices {
            supplier_name: ColumnRef::Index(1),
            tax_id: ColumnRef::Index(5),
            total_amount: ColumnRef::Index(0),
        };
        let err = choices.to_column_map(&available, &HeaderLabels::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn { field: Field::TaxId, .. }));
    }

    #[test]
    fn manual_unknown_column() {
        let available: Vec<String> = vec!["X".into()];
        let choices = ColumnChoices {
            supplier_name: named("nope"),
            tax_id: ColumnRef::Unmapped,
            total_amount: named("X"),
        };
        let err = choices.to_column_map(&available, &HeaderLabels::default()).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn { field: Field::SupplierName, .. }));
    }

    #[test]
    fn letters() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
    }
}
