//! Fatal parse errors

use crate::stage::Stage;
use std::path::PathBuf;

/// The listfile does not have the shape the parser expects.
///
/// Any of these aborts the parse; no partially built state is returned.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("line {line_no} ({stage}): unexpected listfile page header: {line:?}")]
    MalformedHeader {
        stage: Stage,
        line_no: usize,
        line: String,
    },

    #[error("line {line_no} ({stage}): unknown event format: {line:?}")]
    MalformedMarker {
        stage: Stage,
        line_no: usize,
        line: String,
    },

    #[error("line {line_no} ({stage}): malformed summary total: {line:?}")]
    MalformedTotal {
        stage: Stage,
        line_no: usize,
        line: String,
    },

    #[error("line {line_no} ({stage}): page attributed to {file:?}, but this stage has no target file")]
    UnexpectedTargetFile {
        stage: Stage,
        line_no: usize,
        file: String,
    },

    #[error("line {line_no} ({stage}): source path {path:?} contains a parent-directory segment")]
    ParentTraversal {
        stage: Stage,
        line_no: usize,
        path: String,
    },

    #[error("line {line_no} ({stage}): no location tag found for event: {line:?}")]
    AmbiguousLocation {
        stage: Stage,
        line_no: usize,
        line: String,
    },

    #[error("listfile ended during the {stage} stage")]
    Truncated { stage: Stage },
}

impl FormatError {
    /// Physical line the error points at, if any.
    pub fn line_no(&self) -> Option<usize> {
        match self {
            FormatError::MalformedHeader { line_no, .. }
            | FormatError::MalformedMarker { line_no, .. }
            | FormatError::MalformedTotal { line_no, .. }
            | FormatError::UnexpectedTargetFile { line_no, .. }
            | FormatError::ParentTraversal { line_no, .. }
            | FormatError::AmbiguousLocation { line_no, .. } => Some(*line_no),
            FormatError::Truncated { .. } => None,
        }
    }
}

/// Failure to produce a parser state from a listfile.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to open listfile {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read listfile")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// An entry of an ignore list that is not a numeric code.
#[derive(Debug, thiserror::Error)]
#[error("invalid ignore list entry {entry:?}: expecting comma-separated list of numeric values")]
pub struct IgnoreListError {
    pub entry: String,
}
