//! Non-fatal ingestion diagnostics.

use thiserror::Error;

/// A problem found while reading tabular data.
///
/// Warnings never abort a batch: the affected field keeps its default and
/// the rest of the record is still populated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestWarning {
    /// None of the field's header names exists in the header.
    #[error("field '{field}' has no column named {}", names.join("/"))]
    MissingColumn {
        field: &'static str,
        names: Vec<&'static str>,
    },

    /// The row is too short to hold the field's column.
    #[error("line {line}: data is shorter ({len} columns) than field '{field}' index ({index})")]
    ShortRow {
        line: usize,
        field: &'static str,
        index: usize,
        len: usize,
    },

    /// An integer field holds text that does not parse.
    #[error("line {line}: field '{field}' is integer but could not parse '{value}'")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// A populated record could not be converted into a catalog entry.
    #[error("line {line}: {message}")]
    InvalidValue { line: usize, message: String },
}

impl IngestWarning {
    /// Line the warning refers to; header-level warnings have none.
    pub fn line(&self) -> Option<usize> {
        match self {
            IngestWarning::MissingColumn { .. } => None,
            IngestWarning::ShortRow { line, .. }
            | IngestWarning::InvalidInteger { line, .. }
            | IngestWarning::InvalidValue { line, .. } => Some(*line),
        }
    }
}
