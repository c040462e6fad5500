//! The workbook capability the engine runs against.
//!
//! The engine never touches storage directly: it looks sheets up, reads and
//! writes single cells, and asks for populated bounds, all with 1-based
//! indices. [`Book`] implements this directly; [`LinkedWorkbooks`] pairs a
//! read-only source workbook with a writable target workbook.

use crate::config::SheetRef;
use crate::error::SheetRole;
use sheetsync_sheet::{Book, CellValue, SheetError, MAX_COLUMNS, MAX_ROWS};
use std::fmt;

static EMPTY: CellValue = CellValue::Null;

/// Sheet lookup and cell I/O, 1-based throughout.
pub trait Workbook {
    /// Handle to a resolved sheet.
    type Sheet: Copy + fmt::Debug;

    /// Look a sheet up by name or 1-based index.
    fn get_sheet(&self, reference: &SheetRef) -> Option<Self::Sheet>;

    /// Look a sheet up for one side of a rule. Workbooks that keep source
    /// and target sheets apart override this.
    fn resolve_sheet(&self, role: SheetRole, reference: &SheetRef) -> Option<Self::Sheet> {
        let _ = role;
        self.get_sheet(reference)
    }

    /// Read a cell; cells outside the sheet read as empty.
    fn read_cell(&self, sheet: Self::Sheet, row: u32, column: u32) -> &CellValue;

    /// Write a cell, growing the sheet if needed. Positions past the last
    /// XLSX cell are rejected.
    fn write_cell(
        &mut self,
        sheet: Self::Sheet,
        row: u32,
        column: u32,
        value: CellValue,
    ) -> Result<(), SheetError>;

    /// Last row holding a non-empty value, or 0 for an empty sheet.
    fn last_populated_row(&self, sheet: Self::Sheet) -> u32;

    /// Last column holding a non-empty value, or 0 for an empty sheet.
    fn last_populated_column(&self, sheet: Self::Sheet) -> u32;

    /// Human-readable sheet name for logs.
    fn sheet_name(&self, sheet: Self::Sheet) -> String;
}

/// Sheets of a [`Book`] are addressed by their 0-based position.
impl Workbook for Book {
    type Sheet = usize;

    fn get_sheet(&self, reference: &SheetRef) -> Option<usize> {
        match reference {
            SheetRef::Name(name) => self.index_of(name),
            SheetRef::Index(index) => {
                let position = usize::try_from(*index).ok()?.checked_sub(1)?;
                (position < self.sheet_count()).then_some(position)
            }
        }
    }

    fn read_cell(&self, sheet: usize, row: u32, column: u32) -> &CellValue {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.get_sheet_by_index(sheet)
            .map_or(&EMPTY, |s| s.value(row as usize - 1, column as usize - 1))
    }

    fn write_cell(
        &mut self,
        sheet: usize,
        row: u32,
        column: u32,
        value: CellValue,
    ) -> Result<(), SheetError> {
        if !(1..=MAX_ROWS).contains(&row) || !(1..=MAX_COLUMNS).contains(&column) {
            return Err(SheetError::InvalidPosition { row, col: column });
        }
        self.get_sheet_by_index_mut(sheet)?
            .put(row as usize - 1, column as usize - 1, value);
        Ok(())
    }

    fn last_populated_row(&self, sheet: usize) -> u32 {
        self.get_sheet_by_index(sheet)
            .map_or(0, |s| s.last_populated_row() as u32)
    }

    fn last_populated_column(&self, sheet: usize) -> u32 {
        self.get_sheet_by_index(sheet)
            .map_or(0, |s| s.last_populated_col() as u32)
    }

    fn sheet_name(&self, sheet: usize) -> String {
        self.get_sheet_by_index(sheet)
            .map_or_else(|_| format!("#{}", sheet + 1), |s| s.name().to_string())
    }
}

/// A sheet handle in a [`LinkedWorkbooks`] pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linked<S, T> {
    Source(S),
    Target(T),
}

/// A read-only source workbook and a writable target workbook, seen as one.
///
/// Source sheet references resolve against `source`, target references
/// against `target`. Writes to a source-side sheet are rejected.
pub struct LinkedWorkbooks<'a, S: Workbook, T: Workbook> {
    source: &'a S,
    target: &'a mut T,
}

impl<'a, S: Workbook, T: Workbook> LinkedWorkbooks<'a, S, T> {
    pub fn new(source: &'a S, target: &'a mut T) -> Self {
        Self { source, target }
    }
}

impl<S: Workbook, T: Workbook> Workbook for LinkedWorkbooks<'_, S, T> {
    type Sheet = Linked<S::Sheet, T::Sheet>;

    /// Without a role, references resolve against the target workbook.
    fn get_sheet(&self, reference: &SheetRef) -> Option<Self::Sheet> {
        self.resolve_sheet(SheetRole::Target, reference)
    }

    fn resolve_sheet(&self, role: SheetRole, reference: &SheetRef) -> Option<Self::Sheet> {
        match role {
            SheetRole::Source => self.source.get_sheet(reference).map(Linked::Source),
            SheetRole::Target => self.target.get_sheet(reference).map(Linked::Target),
        }
    }

    fn read_cell(&self, sheet: Self::Sheet, row: u32, column: u32) -> &CellValue {
        match sheet {
            Linked::Source(s) => self.source.read_cell(s, row, column),
            Linked::Target(t) => self.target.read_cell(t, row, column),
        }
    }

    fn write_cell(
        &mut self,
        sheet: Self::Sheet,
        row: u32,
        column: u32,
        value: CellValue,
    ) -> Result<(), SheetError> {
        match sheet {
            Linked::Source(s) => Err(SheetError::ReadOnly {
                name: self.source.sheet_name(s),
            }),
            Linked::Target(t) => self.target.write_cell(t, row, column, value),
        }
    }

    fn last_populated_row(&self, sheet: Self::Sheet) -> u32 {
        match sheet {
            Linked::Source(s) => self.source.last_populated_row(s),
            Linked::Target(t) => self.target.last_populated_row(t),
        }
    }

    fn last_populated_column(&self, sheet: Self::Sheet) -> u32 {
        match sheet {
            Linked::Source(s) => self.source.last_populated_column(s),
            Linked::Target(t) => self.target.last_populated_column(t),
        }
    }

    fn sheet_name(&self, sheet: Self::Sheet) -> String {
        match sheet {
            Linked::Source(s) => self.source.sheet_name(s),
            Linked::Target(t) => self.target.sheet_name(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetsync_sheet::Sheet;

    fn book() -> Book {
        let mut book = Book::new();
        book.add_sheet("Source", Sheet::from_data(vec![vec!["ID", "Name"], vec!["1", "A"]]))
            .unwrap();
        book.add_sheet("Target", Sheet::new()).unwrap();
        book
    }

    #[test]
    fn test_book_sheet_lookup() {
        let book = book();
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::from("Source")), Some(0));
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::from("Target")), Some(1));
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::Index(1)), Some(0));
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::Index(2)), Some(1));
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::Index(0)), None);
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::Index(3)), None);
        assert_eq!(Workbook::get_sheet(&book, &SheetRef::from("source")), None);
    }

    #[test]
    fn test_book_cell_io_is_one_based() {
        let mut book = book();
        assert_eq!(Workbook::read_cell(&book, 0, 1, 1), &CellValue::from("ID"));
        assert_eq!(Workbook::read_cell(&book, 0, 2, 2), &CellValue::from("A"));
        assert_eq!(Workbook::read_cell(&book, 0, 0, 1), &CellValue::Null);
        assert_eq!(Workbook::read_cell(&book, 0, 50, 50), &CellValue::Null);

        book.write_cell(1, 5, 3, CellValue::from("X")).unwrap();
        assert_eq!(book.get_sheet("Target").unwrap().get_a1("C5").unwrap(), &CellValue::from("X"));
        assert_eq!(book.last_populated_row(1), 5);
        assert_eq!(book.last_populated_column(1), 3);

        assert!(matches!(
            book.write_cell(1, 0, 3, CellValue::Int(1)),
            Err(SheetError::InvalidPosition { row: 0, col: 3 })
        ));
    }

    #[test]
    fn test_book_rejects_writes_past_xlsx_limits() {
        let mut book = book();
        book.write_cell(1, 1, MAX_COLUMNS, CellValue::Int(1)).unwrap();
        assert_eq!(book.last_populated_column(1), MAX_COLUMNS);
        book.get_sheet_by_index_mut(1).unwrap().data_mut().clear();

        assert!(matches!(
            book.write_cell(1, 1, u32::MAX, CellValue::Int(1)),
            Err(SheetError::InvalidPosition { row: 1, col: u32::MAX })
        ));
        assert!(matches!(
            book.write_cell(1, MAX_ROWS + 1, 1, CellValue::Int(1)),
            Err(SheetError::InvalidPosition { col: 1, .. })
        ));
        assert!(book.get_sheet("Target").unwrap().is_empty());
    }

    #[test]
    fn test_linked_workbooks_keep_sides_apart() {
        let source = book();
        let mut target = Book::new();
        target.add_sheet("Source", Sheet::from_data(vec![vec!["other"]])).unwrap();

        let mut linked = LinkedWorkbooks::new(&source, &mut target);
        let src = linked.resolve_sheet(SheetRole::Source, &SheetRef::from("Source")).unwrap();
        let tgt = linked.resolve_sheet(SheetRole::Target, &SheetRef::from("Source")).unwrap();
        assert_eq!(src, Linked::Source(0));
        assert_eq!(tgt, Linked::Target(0));
        assert_eq!(linked.read_cell(src, 1, 1), &CellValue::from("ID"));
        assert_eq!(linked.read_cell(tgt, 1, 1), &CellValue::from("other"));
        assert!(linked.resolve_sheet(SheetRole::Target, &SheetRef::from("Target")).is_none());

        linked.write_cell(tgt, 2, 2, CellValue::Int(7)).unwrap();
        assert!(matches!(
            linked.write_cell(src, 2, 2, CellValue::Int(7)),
            Err(SheetError::ReadOnly { name }) if name == "Source"
        ));
        assert_eq!(target.get_sheet("Source").unwrap().get(1, 1).unwrap(), &CellValue::Int(7));
    }
}
