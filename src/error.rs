use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SplitError>;

/// Everything that can go wrong while splitting a document into chapters.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// The source could not be loaded, or it has no pages.
    #[error("Invalid source {}: {reason}", .path.display())]
    InvalidSource { path: PathBuf, reason: String },

    /// A range falls outside `1..=total`, or its start is past its end.
    #[error("Range #{index} ({start}-{end}) is out of bounds for a document with {total} page(s)")]
    RangeOutOfBounds {
        /// 1-based position of the range in the range table
        index: usize,
        start: u32,
        end: u32,
        total: u32,
    },

    /// An artifact (or its directory) could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The range table itself is malformed.
    #[error("Invalid range table: {0}")]
    InvalidTable(String),
}

/// Serializable discriminant of [`SplitError`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSource,
    RangeOutOfBounds,
    IoFailure,
    InvalidTable,
}

impl SplitError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SplitError::InvalidSource { .. } => FailureKind::InvalidSource,
            SplitError::RangeOutOfBounds { .. } => FailureKind::RangeOutOfBounds,
            SplitError::IoFailure { .. } => FailureKind::IoFailure,
            SplitError::InvalidTable(_) => FailureKind::InvalidTable,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SplitError::IoFailure {
            path: path.into(),
            source,
        }
    }
}
