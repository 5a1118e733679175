//! `supsum-pipeline` — supplier summary pipeline.
//!
//! Pure engine crate: receives a decoded grid, returns cleaned records,
//! totals and report documents. No CLI or IO dependencies.

pub mod aggregate;
pub mod columns;
pub mod error;
pub mod filter;
pub mod header;
pub mod model;
pub mod normalize;
pub mod report;
pub mod session;
pub mod style;

pub use aggregate::aggregate;
pub use columns::{resolve, ColumnChoices, ColumnRef, ManualSelection, Resolution};
pub use error::PipelineError;
pub use filter::filter;
pub use header::locate;
pub use model::{Cell, ColumnMap, Field, HeaderLabels, HeaderRow, LogicalRecord, RawGrid, TotalRecord};
pub use normalize::normalize;
pub use report::{export, ReportDocument};
pub use session::{ColumnSource, Opened, PendingSession, Session, Summary, SummaryState};
pub use style::{style_for, StyleTag};
