use crate::book::Book;
use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::sheet::Sheet;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn xlsx_error(e: impl Display) -> SheetError {
    SheetError::Xlsx(e.to_string())
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

fn open(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    open_workbook(path).map_err(|e: calamine::XlsxError| xlsx_error(e))
}

/// Read one worksheet, keeping cells at their absolute positions.
fn read_sheet(workbook: &mut Xlsx<BufReader<File>>, name: &str) -> Result<Sheet> {
    let range = workbook.worksheet_range(name).map_err(xlsx_error)?;
    let mut sheet = Sheet::with_name(name);
    let Some((end_row, end_col)) = range.end() else {
        return Ok(sheet);
    };

    // The used range may start below/right of A1
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    let mut grid = vec![vec![CellValue::Null; end_col as usize + 1]; end_row as usize + 1];
    for (row, col, data) in range.cells() {
        grid[row + row_offset as usize][col + col_offset as usize] = data_to_cell_value(data);
    }
    *sheet.data_mut() = grid;

    Ok(sheet)
}

/// Write sheet data to a worksheet
fn write_to_worksheet(sheet: &Sheet, worksheet: &mut Worksheet) -> Result<()> {
    for (row_idx, row) in sheet.data().iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let row_num = u32::try_from(row_idx).map_err(|_| xlsx_error("Row index overflow"))?;
            let col_num =
                u16::try_from(col_idx).map_err(|_| xlsx_error("Column index overflow"))?;

            match cell {
                CellValue::Null => {} // Leave empty
                CellValue::Bool(b) => {
                    worksheet
                        .write_boolean(row_num, col_num, *b)
                        .map_err(xlsx_error)?;
                }
                CellValue::Int(i) => {
                    // Note: Excel stores all numbers as f64, so integers > 2^53
                    // may lose precision
                    worksheet
                        .write_number(row_num, col_num, *i as f64)
                        .map_err(xlsx_error)?;
                }
                CellValue::Float(f) => {
                    worksheet
                        .write_number(row_num, col_num, *f)
                        .map_err(xlsx_error)?;
                }
                CellValue::String(s) => {
                    worksheet
                        .write_string(row_num, col_num, s)
                        .map_err(xlsx_error)?;
                }
            }
        }
    }

    Ok(())
}

impl Book {
    /// Load a book from an Excel file (all sheets, in workbook order)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened or read.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open(path)?;
        let sheet_names: Vec<String> = workbook
            .sheet_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Book1");
        let mut book = Book::with_name(name);

        for sheet_name in sheet_names {
            let sheet = read_sheet(&mut workbook, &sheet_name)?;
            book.add_sheet(&sheet_name, sheet)?;
        }

        Ok(book)
    }

    /// Save the book to an Excel file (cell values only)
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or written.
    pub fn save_as_xlsx<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut workbook = Workbook::new();

        for (name, sheet) in self.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).map_err(xlsx_error)?;
            write_to_worksheet(sheet, worksheet)?;
        }

        workbook.save(path.as_ref()).map_err(xlsx_error)?;

        Ok(())
    }

    /// Get sheet names from an Excel file without loading data
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be opened.
    pub fn xlsx_sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let workbook = open(path.as_ref())?;
        Ok(workbook.sheet_names().iter().map(|s| s.to_string()).collect())
    }
}
