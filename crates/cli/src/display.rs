// Text rendering of a summary view.
//
// The table is built from the same ReportDocument the exporter writes, so
// header/total styling follows one rule in both places.

use supsum_pipeline::report::{ReportDocument, ReportRow, ReportValue};
use supsum_pipeline::{StyleTag, Summary, SummaryState};

const BOLD: &str = "\x1b[1m";
const TOTAL: &str = "\x1b[1;30;47m";
const RESET: &str = "\x1b[0m";

/// Column separator between padded cells.
const GAP: &str = " ";

/// Render the summary table followed by the entry count line.
pub fn render_summary(summary: &Summary, color: bool) -> String {
    let doc = summary.report();
    let mut out = render_document(&doc, color);
    out.push_str(&entry_count_line(summary.entry_count));
    out.push('\n');
    out
}

pub fn entry_count_line(count: usize) -> String {
    format!("Number of entries (excluding total): {}", count)
}

/// Message for a view with nothing to show, `None` when there are records.
pub fn empty_message(summary: &Summary) -> Option<String> {
    match summary.state {
        SummaryState::Records => None,
        SummaryState::NoRecordsInFile => Some("no valid supplier records found in the file".to_string()),
        SummaryState::NoMatches => Some(format!("no records match \"{}\"", summary.query)),
    }
}

fn render_document(doc: &ReportDocument, color: bool) -> String {
    let mut out = String::new();
    for (i, row) in doc.rows.iter().enumerate() {
        let line = render_row(row, &doc.column_widths);
        out.push_str(&paint(&line, row.style(), color));
        out.push('\n');
        if i == 0 {
            let rule: Vec<String> = doc.column_widths.iter().map(|w| "-".repeat(*w)).collect();
            out.push_str(&rule.join(GAP));
            out.push('\n');
        }
    }
    out
}

fn render_row(row: &ReportRow, widths: &[usize]) -> String {
    let cells: Vec<String> = row
        .cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| match &cell.value {
            // Amounts right-aligned, everything else left.
            ReportValue::Number { display, .. } => format!("{:>width$}", display, width = *width),
            other => format!("{:<width$}", other.display(), width = *width),
        })
        .collect();
    cells.join(GAP).trim_end().to_string()
}

fn paint(line: &str, style: StyleTag, color: bool) -> String {
    match (color, style) {
        (false, _) | (true, StyleTag::Plain) => line.to_string(),
        (true, StyleTag::Header) => format!("{}{}{}", BOLD, line, RESET),
        (true, StyleTag::Total) => format!("{}{}{}", TOTAL, line, RESET),
    }
}
