use std::fmt;

use crate::model::Field;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// No row contains both mandatory header labels.
    HeaderNotFound { supplier_label: String, amount_label: String },
    /// A manual column choice did not name any available column.
    UnknownColumn { field: Field, choice: String, available: Vec<String> },
    /// A manual mapping was requested without a mandatory field.
    MissingChoice(Field),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeaderNotFound { supplier_label, amount_label } => {
                write!(f, "could not find the header row (no row contains both '{supplier_label}' and '{amount_label}')")
            }
            Self::UnknownColumn { field, choice, .. } => {
                write!(f, "{field}: unknown column '{choice}'")
            }
            Self::MissingChoice(field) => write!(f, "{field}: no column selected"),
        }
    }
}

impl std::error::Error for PipelineError {}
