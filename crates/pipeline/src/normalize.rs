use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{Cell, ColumnMap, HeaderRow, LogicalRecord, RawGrid};

/// Fraction digits kept on amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Convert every row below the header into a `LogicalRecord`.
///
/// Rows whose three mapped cells are all blank (after trimming) are dropped.
/// The blank check runs on the raw text, so a junk amount keeps its row alive
/// with an absent amount.
pub fn normalize(grid: &RawGrid, header: HeaderRow, columns: &ColumnMap) -> Vec<LogicalRecord> {
    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut unparsed = 0usize;

    for row in (header.0 + 1)..grid.height() {
        let supplier_name = grid.cell(row, columns.supplier_name).to_text().trim().to_string();
        let tax_id = columns
            .tax_id
            .map(|col| grid.cell(row, col).to_text().trim().to_string())
            .unwrap_or_default();
        let amount_cell = grid.cell(row, columns.total_amount);
        let amount_text = amount_cell.to_text();

        if supplier_name.is_empty() && tax_id.is_empty() && amount_text.trim().is_empty() {
            dropped += 1;
            continue;
        }

        let total_amount = parse_amount(amount_cell);
        if total_amount.is_none() && !amount_text.trim().is_empty() {
            log::debug!("row {row}: amount {amount_text:?} is not numeric");
            unparsed += 1;
        }

        records.push(LogicalRecord::new(supplier_name, tax_id, total_amount));
    }

    log::debug!(
        "normalized {} records ({dropped} blank rows dropped, {unparsed} non-numeric amounts)",
        records.len()
    );
    records
}

/// Coerce an amount cell to a 2-digit decimal. Anything unparseable is absent.
pub fn parse_amount(cell: &Cell) -> Option<Decimal> {
    let value = match cell {
        Cell::Blank => return None,
        Cell::Number(n) if !n.is_finite() => return None,
        Cell::Number(n) => match Decimal::from_str(&n.to_string()).or_else(|_| Decimal::try_from(*n)) {
            Ok(value) => value,
            Err(_) => {
                log::warn!("amount {} is outside the supported decimal range", n);
                return None;
            }
        },
        Cell::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            Decimal::from_str(t).or_else(|_| Decimal::from_scientific(t)).ok()?
        }
    };
    Some(round_amount(value))
}

pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
