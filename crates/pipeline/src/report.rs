// Report document: the exportable grid of styled cells.
//
// The document is format-agnostic; `supsum-io` turns it into an xlsx file.
// Built fresh on every export, never cached.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::{Field, LogicalRecord, TotalRecord};
use crate::normalize::AMOUNT_SCALE;
use crate::style::{style_for_record, StyleTag};

/// Excel number format matching `format_amount`.
pub const AMOUNT_NUM_FORMAT: &str = "#,##0.00";

/// Extra width for the first column and for the rest.
const FIRST_COLUMN_PADDING: usize = 4;
const COLUMN_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportValue {
    Text { text: String },
    /// Amount with its rendered form (`1,234.50`).
    Number { value: Decimal, display: String },
    Empty,
}

impl ReportValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }

    pub fn amount(value: Option<Decimal>) -> Self {
        match value {
            Some(value) => Self::Number { value, display: format_amount(value) },
            None => Self::Empty,
        }
    }

    /// Text as it appears in the rendered report.
    pub fn display(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Number { display, .. } => display,
            Self::Empty => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportCell {
    pub value: ReportValue,
    pub style: StyleTag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub cells: Vec<ReportCell>,
}

impl ReportRow {
    fn styled(values: Vec<ReportValue>, style: StyleTag) -> Self {
        Self {
            cells: values.into_iter().map(|value| ReportCell { value, style }).collect(),
        }
    }

    pub fn style(&self) -> StyleTag {
        self.cells.first().map(|c| c.style).unwrap_or(StyleTag::Plain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub rows: Vec<ReportRow>,
    /// Column widths in characters, one per column.
    pub column_widths: Vec<usize>,
}

impl ReportDocument {
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }
}

/// Render `records` followed by `total` into a styled document.
pub fn export(records: &[LogicalRecord], total: &TotalRecord) -> ReportDocument {
    let mut rows = Vec::with_capacity(records.len() + 2);

    rows.push(ReportRow::styled(
        Field::ALL.iter().map(|f| ReportValue::text(f.title())).collect(),
        StyleTag::Header,
    ));

    let total_record = total.to_record();
    for record in records.iter().chain(std::iter::once(&total_record)) {
        rows.push(ReportRow::styled(
            vec![
                ReportValue::text(record.supplier_name.as_str()),
                ReportValue::text(record.tax_id.as_str()),
                ReportValue::amount(record.total_amount),
            ],
            style_for_record(record),
        ));
    }

    let column_widths = column_widths(&rows, Field::ALL.len());
    ReportDocument { rows, column_widths }
}

fn column_widths(rows: &[ReportRow], columns: usize) -> Vec<usize> {
    (0..columns)
        .map(|col| {
            let longest = rows
                .iter()
                .filter_map(|r| r.cells.get(col))
                .map(|c| c.value.display().chars().count())
                .max()
                .unwrap_or(0);
            longest + if col == 0 { FIRST_COLUMN_PADDING } else { COLUMN_PADDING }
        })
        .collect()
}

/// Two fraction digits with thousands separators: `-1234567.5` → `-1,234,567.50`.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = crate::normalize::round_amount(value);
    rounded.rescale(AMOUNT_SCALE);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn two_records() -> Vec<LogicalRecord> {
        vec![
            LogicalRecord::new("Acme Corporation", "TIN-00 123", Some(dec("1234567.5"))),
            LogicalRecord::new("Globex", "", None),
        ]
    }

    #[test]
    fn header_records_and_total() {
        let records = two_records();
        let total = crate::aggregate::aggregate(&records);
        let doc = export(&records, &total);

        assert_eq!(doc.rows.len(), 4);
        let header: Vec<&str> = doc.rows[0].cells.iter().map(|c| c.value.display()).collect();
        assert_eq!(header, vec!["Supplier Name", "TIN", "Total Amount Paid"]);
        assert_eq!(doc.rows[0].style(), StyleTag::Header);

        assert_eq!(doc.rows[1].cells[2].value.display(), "1,234,567.50");
        assert_eq!(doc.rows[2].cells[2].value, ReportValue::Empty);

        let last = &doc.rows[3];
        assert_eq!(last.cells[0].value.display(), "TOTAL");
        assert!(last.cells.iter().all(|c| c.style == StyleTag::Total));
        assert!(doc.rows[1..3].iter().all(|r| r.cells.iter().all(|c| c.style == StyleTag::Plain)));
    }

    #[test]
    fn supplier_named_total_is_styled_too() {
        let records = vec![LogicalRecord::new(" Total ", "", Some(dec("1")))];
        let doc = export(&records, &crate::aggregate::aggregate(&records));
        assert_eq!(doc.rows[1].style(), StyleTag::Total);
    }

    #[test]
    fn widths_follow_longest_cell() {
        let records = two_records();
        let doc = export(&records, &crate::aggregate::aggregate(&records));
        // "Acme Corporation" = 16, "TIN-00 123" = 10, "Total Amount Paid" = 17
        assert_eq!(doc.column_widths, vec![16 + 4, 10 + 2, 17 + 2]);
    }

    #[test]
    fn widths_from_headers_when_empty() {
        let doc = export(&[], &crate::aggregate::aggregate(&[]));
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.column_widths, vec![13 + 4, 3 + 2, 17 + 2]);
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(dec("0")), "0.00");
        assert_eq!(format_amount(dec("999.999")), "1,000.00");
        assert_eq!(format_amount(dec("1000")), "1,000.00");
        assert_eq!(format_amount(dec("-1234.5")), "-1,234.50");
        assert_eq!(format_amount(dec("123456")), "123,456.00");
        assert_eq!(format_amount(dec("-0.001")), "0.00");
    }
}
