//! Rule execution: applies one [`UpdateTarget`] to a source and target sheet.

use crate::config::UpdateTarget;
use crate::error::{ResolveError, SyncError, SyncResult};
use crate::resolve::{ResolveContext, Resolver};
use crate::workbook::Workbook;
use sheetsync_sheet::{to_a1_notation, MAX_ROWS};

/// Outcome of one executed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    /// 0-based position of the rule in `update_target`.
    pub rule: usize,
    pub source_sheet: String,
    pub target_sheet: String,
    /// Inclusive range of target rows processed.
    pub rows: (u32, u32),
    pub cells_written: usize,
}

/// A cell to write, with everything resolved.
struct Assignment {
    target_column: u32,
    source_row: u32,
    source_column: u32,
}

/// Run `rule` against already-resolved sheets.
///
/// Target rows are processed in ascending order and update columns in
/// declared order. A range reaching past the last XLSX row is rejected
/// before anything is written. The first resolution or write failure stops the rule;
/// cells written before it stay written.
pub fn execute<W: Workbook + ?Sized>(
    workbook: &mut W,
    rule_index: usize,
    rule: &UpdateTarget,
    source: W::Sheet,
    target: W::Sheet,
) -> SyncResult<RuleReport> {
    let start = rule.target.start_row;
    let end = rule
        .target
        .end_row
        .unwrap_or_else(|| workbook.last_populated_row(target));
    if start == 0 || start > end || end > MAX_ROWS {
        return Err(SyncError::InvalidRange {
            rule: rule_index,
            start,
            end,
        });
    }

    let source_sheet = workbook.sheet_name(source);
    let target_sheet = workbook.sheet_name(target);
    tracing::debug!(
        "rule {}: {} -> {}, target rows {}..={}",
        rule_index,
        source_sheet,
        target_sheet,
        start,
        end
    );

    let mut cells_written = 0;
    for row in start..=end {
        let mut ctx = ResolveContext::for_row(row);

        for (column_index, update) in rule.target.update_columns.iter().enumerate() {
            let resolve_err = |source: ResolveError| SyncError::Resolve {
                rule: rule_index,
                row,
                column: column_index,
                source,
            };

            let assignment = {
                let resolver = Resolver::new(&*workbook, target);
                let target_column = resolver
                    .resolve_column(target, &update.column)
                    .map_err(resolve_err)?;
                let coord = &update.source_value_coord;
                let source_column = resolver
                    .resolve_column(source, &coord.column)
                    .map_err(resolve_err)?;
                ctx.target_column = target_column;
                let source_row = resolver
                    .resolve_row(source, &coord.row, &ctx)
                    .map_err(resolve_err)?;
                Assignment {
                    target_column,
                    source_row,
                    source_column,
                }
            };
            ctx.previous_source_row = Some(assignment.source_row);

            let value = workbook
                .read_cell(source, assignment.source_row, assignment.source_column)
                .clone();
            tracing::trace!(
                "rule {}: {}!{} = {:?} from {}!{}",
                rule_index,
                target_sheet,
                to_a1_notation(row, assignment.target_column),
                value,
                source_sheet,
                to_a1_notation(assignment.source_row, assignment.source_column)
            );
            workbook
                .write_cell(target, row, assignment.target_column, value)
                .map_err(|source| SyncError::Write {
                    rule: rule_index,
                    row,
                    column: column_index,
                    source,
                })?;
            cells_written += 1;
        }
    }

    Ok(RuleReport {
        rule: rule_index,
        source_sheet,
        target_sheet,
        rows: (start, end),
        cells_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CellConstraint, Column, SourceRow, SyncConfig};
    use crate::error::ErrorKind;
    use sheetsync_sheet::{Book, CellValue, Sheet};

    const SOURCE: usize = 0;
    const TARGET: usize = 1;

    fn rule(yaml: &str) -> UpdateTarget {
        let mut config = SyncConfig::from_yaml_str(yaml).unwrap();
        config.update_target.remove(0)
    }

    fn book(source: Sheet, target: Sheet) -> Book {
        let mut book = Book::new();
        book.add_sheet("Source", source).unwrap();
        book.add_sheet("Target", target).unwrap();
        book
    }

    fn cell(book: &Book, sheet: &str, a1: &str) -> CellValue {
        book.get_sheet(sheet).unwrap().get_a1(a1).unwrap().clone()
    }

    const COPY_B_BY_ID: &str = r#"
update_target:
  source: { sheet: Source }
  target:
    sheet: Target
    start_row: 2
    update_columns:
      - column: C
        source_value_coord:
          column: B
          row:
            find_in_column:
              - source_column: A
                target_value: { column_for_current_row: A }
"#;

    #[test]
    fn test_copies_matched_values() {
        let source = Sheet::from_data(vec![
            vec![CellValue::from("ID"), CellValue::from("Name")],
            vec![CellValue::Int(1), CellValue::from("one")],
            vec![CellValue::Int(2), CellValue::from("two")],
        ]);
        let target = Sheet::from_data(vec![
            vec![CellValue::from("ID")],
            vec![CellValue::Int(2)],
            vec![CellValue::Int(1)],
        ]);
        let mut book = book(source, target);

        let report = execute(&mut book, 0, &rule(COPY_B_BY_ID), SOURCE, TARGET).unwrap();
        assert_eq!(report.rows, (2, 3));
        assert_eq!(report.cells_written, 2);
        assert_eq!(report.source_sheet, "Source");
        assert_eq!(report.target_sheet, "Target");
        assert_eq!(cell(&book, "Target", "C2"), CellValue::from("two"));
        assert_eq!(cell(&book, "Target", "C3"), CellValue::from("one"));
        assert_eq!(cell(&book, "Source", "B2"), CellValue::from("one"));
    }

    #[test]
    fn test_missing_row_reports_location() {
        let source = Sheet::from_data(vec![vec!["ID", "Name"], vec!["1", "one"]]);
        let target = Sheet::from_data(vec![vec!["ID"], vec!["1"], vec!["9"]]);
        let mut book = book(source, target);

        let err = execute(&mut book, 4, &rule(COPY_B_BY_ID), SOURCE, TARGET).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RowNotFound);
        assert!(matches!(err, SyncError::Resolve { rule: 4, row: 3, column: 0, .. }));
        // Row 2 was written before row 3 failed
        assert_eq!(cell(&book, "Target", "C2"), CellValue::from("one"));
    }

    #[test]
    fn test_invalid_range() {
        let mut book = book(Sheet::new(), Sheet::from_data(vec![vec!["a"]]));
        let mut rule = rule(COPY_B_BY_ID);

        // start_row 2 is past the last populated target row
        let err = execute(&mut book, 0, &rule, SOURCE, TARGET).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRange { rule: 0, start: 2, end: 1 }));

        rule.target.start_row = 0;
        rule.target.end_row = Some(3);
        let err = execute(&mut book, 0, &rule, SOURCE, TARGET).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn test_rejects_coordinates_past_xlsx_limits() {
        let source = Sheet::from_data(vec![vec!["ID", "Name"], vec!["1", "one"]]);
        let target = Sheet::from_data(vec![vec!["ID"], vec!["1"]]);
        let mut book = book(source, target);

        let mut wide = rule(COPY_B_BY_ID);
        wide.target.update_columns[0].column = Column::Index(4_294_967_295);
        let err = execute(&mut book, 0, &wide, SOURCE, TARGET).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidReference);
        assert!(matches!(err, SyncError::Resolve { rule: 0, row: 2, column: 0, .. }));

        let mut tall = rule(COPY_B_BY_ID);
        tall.target.end_row = Some(u32::MAX);
        let err = execute(&mut book, 0, &tall, SOURCE, TARGET).unwrap_err();
        assert!(matches!(err, SyncError::InvalidRange { start: 2, end: u32::MAX, .. }));

        assert_eq!(book.get_sheet("Target").unwrap().col_count(), 1);
        assert_eq!(book.get_sheet("Target").unwrap().row_count(), 2);
    }

    #[test]
    fn test_single_row_range() {
        let source = Sheet::from_data(vec![vec!["v"]]);
        let mut book = book(source, Sheet::new());
        let rule = rule(
            r#"
update_target:
  source: { sheet: 1 }
  target:
    sheet: 2
    start_row: 4
    end_row: 4
    update_columns:
      - column: 2
        source_value_coord:
          column: A
          row:
            find_in_column:
              - source_column: A
                target_value: { value: v }
"#,
        );

        let report = execute(&mut book, 0, &rule, SOURCE, TARGET).unwrap();
        assert_eq!(report.rows, (4, 4));
        assert_eq!(cell(&book, "Target", "B4"), CellValue::from("v"));
    }

    #[test]
    fn test_first_column_cannot_reuse_previous_row() {
        let mut book = book(Sheet::from_data(vec![vec!["x"]]), Sheet::from_data(vec![vec!["x"]]));
        let mut rule = rule(COPY_B_BY_ID);
        rule.target.start_row = 1;
        rule.target.update_columns[0].source_value_coord.row =
            SourceRow::SameWithPreviousColumn;

        let err = execute(&mut book, 0, &rule, SOURCE, TARGET).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoPreviousColumn);
    }

    #[test]
    fn test_target_column_resolves_against_target_sheet() {
        let source = Sheet::from_data(vec![vec!["key", "val"], vec!["k", "found"]]);
        let target = Sheet::from_data(vec![vec!["key", "", "", "Result"], vec!["k"]]);
        let mut book = book(source, target);
        let mut rule = rule(COPY_B_BY_ID);
        rule.target.update_columns[0].column = Column::Matched(vec![CellConstraint {
            row: 1,
            value: CellValue::from("Result"),
        }]);

        execute(&mut book, 0, &rule, SOURCE, TARGET).unwrap();
        assert_eq!(cell(&book, "Target", "D2"), CellValue::from("found"));
    }
}
