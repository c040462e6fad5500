//! Error types for sheetsync.

use crate::config::SheetRef;
use sheetsync_sheet::SheetError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync runs.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure to resolve a single coordinate.
///
/// These carry no location: the executor attaches rule index, target row
/// and update-column index when it wraps them into a [`SyncError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A literal column, fixed row, or sheet index that does not address a cell.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// No column satisfies every `find_in_row` constraint.
    #[error("no column matches {constraints}")]
    ColumnNotFound { constraints: String },

    /// No row satisfies every `find_in_column` criterion.
    #[error("no row matches {criteria}")]
    RowNotFound { criteria: String },

    /// `same_with_previous_column` used where no source row was resolved yet.
    #[error("same_with_previous_column has no previous update column in this row")]
    NoPreviousColumn,
}

/// Which side of a rule a sheet reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetRole {
    Source,
    Target,
}

impl fmt::Display for SheetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRole::Source => write!(f, "source"),
            SheetRole::Target => write!(f, "target"),
        }
    }
}

/// The error kinds a sync run can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SheetNotFound,
    InvalidReference,
    ColumnNotFound,
    RowNotFound,
    NoPreviousColumn,
    InvalidRange,
    WriteFailed,
}

impl From<&ResolveError> for ErrorKind {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::InvalidReference(_) => ErrorKind::InvalidReference,
            ResolveError::ColumnNotFound { .. } => ErrorKind::ColumnNotFound,
            ResolveError::RowNotFound { .. } => ErrorKind::RowNotFound,
            ResolveError::NoPreviousColumn => ErrorKind::NoPreviousColumn,
        }
    }
}

/// Errors raised while running sync rules.
///
/// `rule` and `column` are 0-based positions in `update_target` and
/// `update_columns`; `row` is the 1-based target row being processed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("update_target[{rule}]: {role} sheet not found: {reference}")]
    SheetNotFound {
        rule: usize,
        role: SheetRole,
        reference: SheetRef,
    },

    #[error("update_target[{rule}]: invalid target row range {start}..={end}")]
    InvalidRange { rule: usize, start: u32, end: u32 },

    #[error("update_target[{rule}], target row {row}, update_columns[{column}]: {source}")]
    Resolve {
        rule: usize,
        row: u32,
        column: usize,
        #[source]
        source: ResolveError,
    },

    #[error("update_target[{rule}], target row {row}, update_columns[{column}]: write failed: {source}")]
    Write {
        rule: usize,
        row: u32,
        column: usize,
        #[source]
        source: SheetError,
    },
}

impl SyncError {
    /// The kind of failure, independent of its location.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::SheetNotFound { .. } => ErrorKind::SheetNotFound,
            SyncError::InvalidRange { .. } => ErrorKind::InvalidRange,
            SyncError::Resolve { source, .. } => ErrorKind::from(source),
            SyncError::Write { .. } => ErrorKind::WriteFailed,
        }
    }

    /// Index of the rule that failed.
    pub fn rule(&self) -> usize {
        match self {
            SyncError::SheetNotFound { rule, .. }
            | SyncError::InvalidRange { rule, .. }
            | SyncError::Resolve { rule, .. }
            | SyncError::Write { rule, .. } => *rule,
        }
    }
}

/// Errors raised while loading or validating a [`SyncConfig`](crate::SyncConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}: start_row {start} is after end_row {end}")]
    InvalidRange { path: String, start: u32, end: u32 },

    #[error("{path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: ResolveError,
    },
}

impl ConfigError {
    pub(crate) fn invalid(path: impl Into<String>, source: ResolveError) -> Self {
        Self::Invalid {
            path: path.into(),
            source,
        }
    }
}
