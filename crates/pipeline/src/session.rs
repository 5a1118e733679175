// Controller state for one uploaded sheet.
//
// Header and columns are resolved once per upload; every query re-runs the
// filter and aggregate steps against the normalized records.

use std::rc::Rc;

use serde::Serialize;

use crate::aggregate::aggregate;
use crate::columns::{column_labels, resolve, ColumnChoices, ManualSelection, Resolution};
use crate::error::PipelineError;
use crate::filter::filter;
use crate::header::locate;
use crate::model::{ColumnMap, HeaderLabels, HeaderRow, LogicalRecord, RawGrid, TotalRecord};
use crate::normalize::normalize;
use crate::report::{export, ReportDocument};

/// How the column map was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSource {
    Automatic,
    Manual,
}

#[derive(Debug, Clone)]
pub struct Session {
    grid: Rc<RawGrid>,
    header: HeaderRow,
    columns: ColumnMap,
    source: ColumnSource,
    records: Vec<LogicalRecord>,
}

/// Result of opening a grid: ready to query, or waiting on a manual mapping.
#[derive(Debug, Clone)]
pub enum Opened {
    Ready(Session),
    NeedsManualInput(PendingSession),
}

/// A grid whose header was found but whose columns need a manual choice.
#[derive(Debug, Clone)]
pub struct PendingSession {
    grid: Rc<RawGrid>,
    header: HeaderRow,
    labels: HeaderLabels,
    selection: ManualSelection,
}

impl PendingSession {
    pub fn selection(&self) -> &ManualSelection {
        &self.selection
    }

    pub fn header(&self) -> HeaderRow {
        self.header
    }

    /// Second phase: apply the caller's choices and normalize.
    pub fn apply(self, choices: &ColumnChoices) -> Result<Session, PipelineError> {
        let columns = choices.to_column_map(&self.selection.labels, &self.labels)?;
        Ok(Session::build(self.grid, self.header, columns, ColumnSource::Manual))
    }
}

impl Session {
    /// Locate the header and try automatic column resolution.
    pub fn open(grid: Rc<RawGrid>, labels: &HeaderLabels) -> Result<Opened, PipelineError> {
        let header = locate(&grid, labels)?;
        match resolve(&grid, header, labels) {
            Resolution::Resolved(columns) => {
                Ok(Opened::Ready(Self::build(grid, header, columns, ColumnSource::Automatic)))
            }
            Resolution::NeedsManualInput(selection) => Ok(Opened::NeedsManualInput(PendingSession {
                grid,
                header,
                labels: labels.clone(),
                selection,
            })),
        }
    }

    /// Locate the header and use `choices` instead of automatic resolution.
    pub fn open_with_choices(
        grid: Rc<RawGrid>,
        labels: &HeaderLabels,
        choices: &ColumnChoices,
    ) -> Result<Self, PipelineError> {
        let header = locate(&grid, labels)?;
        let available = column_labels(&grid, header);
        let columns = choices.to_column_map(&available, labels)?;
        Ok(Self::build(grid, header, columns, ColumnSource::Manual))
    }

    fn build(grid: Rc<RawGrid>, header: HeaderRow, columns: ColumnMap, source: ColumnSource) -> Self {
        let records = normalize(&grid, header, &columns);
        log::info!(
            "header at row {}, {} records, columns {:?} ({:?})",
            header.0 + 1,
            records.len(),
            columns,
            source
        );
        Self { grid, header, columns, source, records }
    }

    pub fn grid(&self) -> &Rc<RawGrid> {
        &self.grid
    }

    pub fn header(&self) -> HeaderRow {
        self.header
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn column_source(&self) -> ColumnSource {
        self.source
    }

    /// All normalized records, unfiltered.
    pub fn records(&self) -> &[LogicalRecord] {
        &self.records
    }

    /// Filter by `query` and total what remains.
    pub fn view(&self, query: &str) -> Summary {
        let records = filter(&self.records, query);
        let total = aggregate(&records);
        let state = if self.records.is_empty() {
            SummaryState::NoRecordsInFile
        } else if records.is_empty() {
            SummaryState::NoMatches
        } else {
            SummaryState::Records
        };
        Summary {
            query: query.trim().to_string(),
            entry_count: records.len(),
            records,
            total,
            state,
        }
    }

    /// Fresh report document for the records matching `query`.
    pub fn report(&self, query: &str) -> ReportDocument {
        self.view(query).report()
    }
}

/// Distinguishes an empty file from a query that matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryState {
    NoRecordsInFile,
    NoMatches,
    Records,
}

/// Records visible for one query plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub query: String,
    pub state: SummaryState,
    pub records: Vec<LogicalRecord>,
    pub total: TotalRecord,
    /// Record count, excluding the total row.
    pub entry_count: usize,
}

impl Summary {
    pub fn report(&self) -> ReportDocument {
        export(&self.records, &self.total)
    }

    /// Records followed by the total row, as displayed.
    pub fn display_rows(&self) -> Vec<LogicalRecord> {
        let mut rows = self.records.clone();
        rows.push(self.total.to_record());
        rows
    }
}
