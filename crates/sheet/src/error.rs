use thiserror::Error;

/// Errors that can occur during sheet and book operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Index out of bounds: row {row}, col {col} (sheet has {rows} rows, {cols} cols)")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid cell position: row {row}, col {col} (rows are 1..=1048576, columns 1..=16384)")]
    InvalidPosition { row: u32, col: u32 },

    #[error("Invalid cell notation: {0}")]
    InvalidCellNotation(String),

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Sheet is read-only: {name}")]
    ReadOnly { name: String },

    #[error("XLSX error: {0}")]
    Xlsx(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;
