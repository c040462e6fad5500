use crate::a1_notation::{parse_a1, MAX_COLUMNS, MAX_ROWS};
use crate::cell::CellValue;
use crate::error::{Result, SheetError};

static EMPTY: CellValue = CellValue::Null;

/// A sheet representing a 2D grid of cells (row-major storage)
///
/// The grid is kept rectangular: every row has `col_count()` cells. Writes
/// through [`Sheet::put`] grow the grid with empty cells as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    data: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create a new empty sheet
    #[must_use]
    pub fn new() -> Self {
        Self::with_name("Sheet1")
    }

    /// Create a new empty sheet with a name
    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            data: Vec::new(),
        }
    }

    /// Create a sheet from a 2D vector of values
    ///
    /// Ragged input is padded with empty cells to the widest row.
    #[must_use]
    pub fn from_data<T: Into<CellValue>>(data: Vec<Vec<T>>) -> Self {
        let mut sheet = Sheet::new();
        *sheet.data_mut() = data
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        sheet.normalize();
        sheet
    }

    /// Get the sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Get the number of rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    /// Check if the sheet is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of the last row (1-based) that holds a non-empty value, or 0
    #[must_use]
    pub fn last_populated_row(&self) -> usize {
        self.data
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map_or(0, |idx| idx + 1)
    }

    /// Number of the last column (1-based) that holds a non-empty value, or 0
    #[must_use]
    pub fn last_populated_col(&self) -> usize {
        self.data
            .iter()
            .filter_map(|row| row.iter().rposition(|cell| !cell.is_empty()))
            .max()
            .map_or(0, |idx| idx + 1)
    }

    // ===== Cell Access =====

    /// Get a cell value by row and column index (0-based)
    pub fn get(&self, row: usize, col: usize) -> Result<&CellValue> {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows: self.row_count(),
                cols: self.col_count(),
            })
    }

    /// Get a cell value by row and column index (0-based), treating cells
    /// outside the grid as empty
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        self.data
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Set a cell value by row and column index (0-based)
    ///
    /// Fails if the position is outside the grid; see [`Sheet::put`].
    pub fn set<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let rows = self.row_count();
        let cols = self.col_count();
        let cell = self
            .data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(SheetError::IndexOutOfBounds {
                row,
                col,
                rows,
                cols,
            })?;
        *cell = value.into();
        Ok(())
    }

    /// Set a cell value by row and column index (0-based), growing the grid
    /// if the position lies outside it
    ///
    /// Existing rows are only touched when the grid gets wider.
    pub fn put<T: Into<CellValue>>(&mut self, row: usize, col: usize, value: T) {
        let width = self.col_count().max(col + 1);
        if width > self.col_count() {
            for r in &mut self.data {
                r.resize(width, CellValue::Null);
            }
        }
        if self.data.len() <= row {
            self.data.resize_with(row + 1, || vec![CellValue::Null; width]);
        }
        self.data[row][col] = value.into();
    }

    // ===== A1-Style Notation Access =====

    /// Get a cell value using A1-style notation (e.g., "A1", "B2")
    pub fn get_a1(&self, notation: &str) -> Result<&CellValue> {
        let (row, col) = parse_a1(notation)?;
        self.get(row as usize - 1, col as usize - 1)
    }

    /// Set a cell value using A1-style notation, growing the grid as needed
    ///
    /// Positions past the last XLSX cell (XFD1048576) are rejected.
    pub fn set_a1<T: Into<CellValue>>(&mut self, notation: &str, value: T) -> Result<()> {
        let (row, col) = parse_a1(notation)?;
        if row > MAX_ROWS || col > MAX_COLUMNS {
            return Err(SheetError::InvalidPosition { row, col });
        }
        self.put(row as usize - 1, col as usize - 1, value);
        Ok(())
    }

    // ===== Data Access =====

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.data.iter()
    }

    /// Get the underlying data
    #[must_use]
    pub fn data(&self) -> &Vec<Vec<CellValue>> {
        &self.data
    }

    /// Get mutable access to the underlying data
    ///
    /// Call [`Sheet::normalize`] afterwards if rows may differ in length.
    pub fn data_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.data
    }

    /// Pad every row with empty cells to the width of the widest row
    pub fn normalize(&mut self) {
        let width = self.data.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut self.data {
            row.resize(width, CellValue::Null);
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}
