//! Sheet/Book model for sheetsync
//!
//! Provides the in-memory workbook that sync rules read from and write to:
//! typed cell values, rectangular sheets, insertion-ordered books, A1
//! notation helpers, and XLSX import/export.
//!
//! # Examples
//!
//! ## Creating a sheet from data
//!
//! ```
//! use sheetsync_sheet::{CellValue, Sheet};
//!
//! let mut sheet = Sheet::from_data(vec![
//!     vec!["ID", "Name"],
//!     vec!["42", "X"],
//! ]);
//!
//! assert_eq!(sheet.row_count(), 2);
//! sheet.set_a1("C5", 7).unwrap();
//! assert_eq!(sheet.last_populated_row(), 5);
//! assert_eq!(sheet.get_a1("C5").unwrap(), &CellValue::Int(7));
//! ```
//!
//! ## Working with books
//!
//! ```
//! use sheetsync_sheet::{Book, Sheet};
//!
//! let mut book = Book::new();
//! book.add_sheet("Source", Sheet::new()).unwrap();
//! book.add_sheet("Target", Sheet::new()).unwrap();
//!
//! assert_eq!(book.sheet_count(), 2);
//! assert_eq!(book.index_of("Target"), Some(1));
//! ```
//!
//! ## Loading from XLSX
//!
//! ```no_run
//! use sheetsync_sheet::Book;
//!
//! let book = Book::from_xlsx("source.xlsx").unwrap();
//! ```

mod a1_notation;
mod book;
mod cell;
mod error;
mod sheet;
mod xlsx;

/// Re-export A1 notation helpers (1-based).
pub use a1_notation::{
    column_name, column_number, parse_a1, to_a1_notation, MAX_COLUMNS, MAX_ROWS,
};
/// Re-export book type.
pub use book::Book;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export sheet error types.
pub use error::{Result, SheetError};
/// Re-export sheet type.
pub use sheet::Sheet;
