//! # sheetsync-core
//!
//! Declarative spreadsheet-to-spreadsheet synchronization.
//!
//! A [`SyncConfig`] lists update rules. Each rule walks a range of target
//! rows and, for every update column, locates a source cell (by literal
//! coordinates or by matching header and key values) and copies its value
//! into the target row.
//!
//! This crate provides:
//! - The config schema and its YAML/JSON encodings
//! - The [`Workbook`] capability the engine runs against
//! - Coordinate resolution, rule execution, and the sync driver
//!
//! ```
//! use sheetsync_core::{driver, SyncConfig};
//! use sheetsync_sheet::{Book, CellValue, Sheet};
//!
//! let config = SyncConfig::from_yaml_str(r#"
//! update_target:
//!   source: { sheet: Prices }
//!   target:
//!     sheet: Orders
//!     start_row: 2
//!     update_columns:
//!       - column: C
//!         source_value_coord:
//!           column: { find_in_row: [[1, "Price"]] }
//!           row:
//!             find_in_column:
//!               - source_column: A
//!                 target_value: { column_for_current_row: A }
//! "#).unwrap();
//!
//! let mut book = Book::new();
//! book.add_sheet("Prices", Sheet::from_data(vec![
//!     vec![CellValue::from("Item"), CellValue::from("Price")],
//!     vec![CellValue::from("apple"), CellValue::Float(0.5)],
//! ])).unwrap();
//! book.add_sheet("Orders", Sheet::from_data(vec![vec!["Item"], vec!["apple"]])).unwrap();
//!
//! let report = driver::run(&config, &mut book).unwrap();
//! assert_eq!(report.cells_written(), 1);
//! assert_eq!(book.get_sheet("Orders").unwrap().get_a1("C2").unwrap(), &CellValue::Float(0.5));
//! ```

/// Config schema, parsing, and validation.
pub mod config;
/// Sync driver and run options.
pub mod driver;
/// Error types and result aliases.
pub mod error;
/// Single-rule execution.
pub mod executor;
/// Coordinate resolution.
pub mod resolve;
/// Workbook capability and adapters.
pub mod workbook;

pub use config::{
    CellConstraint, Column, RowCriterion, RuleType, SheetRef, SourceRow, SourceSheet,
    SourceValueCoord, SyncConfig, SyncType, TargetSpec, TargetValue, UpdateColumn, UpdateTarget,
};
pub use driver::{OnRuleError, RunOptions, SyncReport};
pub use error::{ConfigError, ErrorKind, ResolveError, SheetRole, SyncError, SyncResult};
pub use executor::RuleReport;
pub use resolve::{ResolveContext, Resolver};
pub use workbook::{Linked, LinkedWorkbooks, Workbook};
