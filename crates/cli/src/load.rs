// Opening a session from command-line input: cache lookup, header search,
// and column resolution with the --*-col flags as manual override.

use std::path::PathBuf;
use std::rc::Rc;

use clap::Args;
use supsum_io::SheetCache;
use supsum_pipeline::columns::col_letter;
use supsum_pipeline::{ColumnChoices, ColumnRef, Field, HeaderLabels, ManualSelection, Opened, Session};

use crate::CliError;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Procurement file (.xlsx, .xlsm, .xls, .xlsb, .ods, .csv, .tsv)
    pub file: PathBuf,

    /// Supplier name column: header label, letter (B) or 1-based number
    #[arg(long, value_name = "COL")]
    pub supplier_col: Option<String>,

    /// TIN column, or `none` to leave it unmapped
    #[arg(long, value_name = "COL")]
    pub tin_col: Option<String>,

    /// Total amount column: header label, letter or 1-based number
    #[arg(long, value_name = "COL")]
    pub amount_col: Option<String>,
}

impl InputArgs {
    fn has_overrides(&self) -> bool {
        self.supplier_col.is_some() || self.tin_col.is_some() || self.amount_col.is_some()
    }

    /// Flags take precedence; unflagged fields keep their detected column.
    fn choices(
        &self,
        detected: [Option<usize>; 3],
        selection: Option<&ManualSelection>,
    ) -> Result<ColumnChoices, CliError> {
        let [supplier, tax_id, amount] = detected;
        let pick = |flag: &Option<String>, detected: Option<usize>| match (flag, detected) {
            (Some(text), _) => Some(parse_ref(text)),
            (None, Some(i)) => Some(ColumnRef::Index(i)),
            (None, None) => None,
        };

        let missing_flag = |field: Field| match selection {
            Some(sel) => CliError::ambiguous(sel, Some(field)),
            None => CliError::args(format!("no column for {}", field.title())),
        };

        Ok(ColumnChoices {
            supplier_name: pick(&self.supplier_col, supplier).ok_or_else(|| missing_flag(Field::SupplierName))?,
            tax_id: pick(&self.tin_col, tax_id).unwrap_or(ColumnRef::Unmapped),
            total_amount: pick(&self.amount_col, amount).ok_or_else(|| missing_flag(Field::TotalAmount))?,
        })
    }
}

fn parse_ref(text: &str) -> ColumnRef {
    match text.parse::<ColumnRef>() {
        Ok(r) => r,
        Err(never) => match never {},
    }
}

/// Load `input.file` through the cache and resolve its columns.
pub fn open_session(cache: &mut SheetCache, labels: &HeaderLabels, input: &InputArgs) -> Result<Session, CliError> {
    let grid = cache.load(&input.file).map_err(CliError::ingest)?;

    match Session::open(grid, labels).map_err(CliError::pipeline)? {
        Opened::Ready(session) if !input.has_overrides() => Ok(session),
        Opened::Ready(session) => {
            let columns = session.columns();
            let choices = input.choices(
                [Some(columns.supplier_name), columns.tax_id, Some(columns.total_amount)],
                None,
            )?;
            log::debug!("column flags override detected columns {:?}", columns);
            Session::open_with_choices(Rc::clone(session.grid()), labels, &choices).map_err(CliError::pipeline)
        }
        Opened::NeedsManualInput(pending) => {
            let selection = pending.selection();
            let position = |field: Field| {
                let wanted = labels.label(field);
                selection.labels.iter().position(|l| *l == wanted)
            };
            let detected = [
                position(Field::SupplierName),
                position(Field::TaxId),
                position(Field::TotalAmount),
            ];
            if !input.has_overrides() {
                return Err(CliError::ambiguous(selection, None));
            }
            let choices = input.choices(detected, Some(selection))?;
            pending.apply(&choices).map_err(CliError::pipeline)
        }
    }
}

/// `A=NAME OF SUPPLIERS, B=TIN, ...` for hints.
pub fn describe_labels(labels: &[String]) -> String {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let shown = if l.is_empty() { "(blank)" } else { l.as_str() };
            format!("{}={}", col_letter(i), shown)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
