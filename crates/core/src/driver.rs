//! Sync driver: runs every rule of a [`SyncConfig`] in declared order.
//!
//! Rules share the workbook, so a later rule sees the writes of an earlier
//! one. Whether a failing rule stops the run is decided by [`RunOptions`].

use crate::config::{SheetRef, SyncConfig, UpdateTarget};
use crate::error::{SheetRole, SyncError, SyncResult};
use crate::executor::{execute, RuleReport};
use crate::workbook::{LinkedWorkbooks, Workbook};

/// What to do when a rule fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnRuleError {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Record the error, keep the failing rule's earlier writes, and go on
    /// with the next rule.
    SkipRule,
}

/// Options for a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub on_rule_error: OnRuleError,
}

impl RunOptions {
    pub fn keep_going() -> Self {
        Self {
            on_rule_error: OnRuleError::SkipRule,
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Rules that ran to completion, in order.
    pub rules: Vec<RuleReport>,
    /// Rules skipped under [`OnRuleError::SkipRule`].
    pub failures: Vec<SyncError>,
}

impl SyncReport {
    /// Total cells written by completed rules.
    pub fn cells_written(&self) -> usize {
        self.rules.iter().map(|r| r.cells_written).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run `config` against a workbook holding both source and target sheets.
pub fn run<W: Workbook + ?Sized>(config: &SyncConfig, workbook: &mut W) -> SyncResult<SyncReport> {
    run_with_options(config, workbook, RunOptions::default())
}

/// Run `config` against a single workbook with explicit options.
pub fn run_with_options<W: Workbook + ?Sized>(
    config: &SyncConfig,
    workbook: &mut W,
    options: RunOptions,
) -> SyncResult<SyncReport> {
    let mut report = SyncReport::default();

    for (index, rule) in config.update_target.iter().enumerate() {
        match run_rule(workbook, index, rule) {
            Ok(rule_report) => report.rules.push(rule_report),
            Err(err) => match options.on_rule_error {
                OnRuleError::Abort => return Err(err),
                OnRuleError::SkipRule => {
                    tracing::warn!("skipping rule {}: {}", index, err);
                    report.failures.push(err);
                }
            },
        }
    }

    tracing::info!(
        "sync finished: {} rule(s) applied, {} cell(s) written, {} rule(s) failed",
        report.rules.len(),
        report.cells_written(),
        report.failures.len()
    );
    Ok(report)
}

/// Run `config` with source sheets read from `source` and target sheets
/// written in `target`.
pub fn run_linked<S: Workbook, T: Workbook>(
    config: &SyncConfig,
    source: &S,
    target: &mut T,
) -> SyncResult<SyncReport> {
    run_linked_with_options(config, source, target, RunOptions::default())
}

/// [`run_linked`] with explicit options.
pub fn run_linked_with_options<S: Workbook, T: Workbook>(
    config: &SyncConfig,
    source: &S,
    target: &mut T,
    options: RunOptions,
) -> SyncResult<SyncReport> {
    let mut linked = LinkedWorkbooks::new(source, target);
    run_with_options(config, &mut linked, options)
}

fn run_rule<W: Workbook + ?Sized>(
    workbook: &mut W,
    index: usize,
    rule: &UpdateTarget,
) -> SyncResult<RuleReport> {
    let source = lookup(workbook, index, SheetRole::Source, &rule.source.sheet)?;
    let target = lookup(workbook, index, SheetRole::Target, &rule.target.sheet)?;
    execute(workbook, index, rule, source, target)
}

fn lookup<W: Workbook + ?Sized>(
    workbook: &W,
    rule: usize,
    role: SheetRole,
    reference: &SheetRef,
) -> SyncResult<W::Sheet> {
    workbook
        .resolve_sheet(role, reference)
        .ok_or_else(|| SyncError::SheetNotFound {
            rule,
            role,
            reference: reference.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use sheetsync_sheet::{Book, CellValue, Sheet};

    const TWO_RULES: &str = r#"
update_target:
  - source: { sheet: Missing }
    target:
      sheet: Target
      start_row: 1
      update_columns:
        - column: B
          source_value_coord: { column: A, row: { find_in_column: [] } }
  - source: { sheet: Source }
    target:
      sheet: Target
      start_row: 1
      update_columns:
        - column: B
          source_value_coord:
            column: B
            row:
              find_in_column:
                - source_column: A
                  target_value: { column_for_current_row: A }
"#;

    fn book() -> Book {
        let mut book = Book::new();
        book.add_sheet("Source", Sheet::from_data(vec![vec!["k", "v"]])).unwrap();
        book.add_sheet("Target", Sheet::from_data(vec![vec!["k"]])).unwrap();
        book
    }

    #[test]
    fn test_abort_is_default() {
        let config = SyncConfig::from_yaml_str(TWO_RULES).unwrap();
        let mut book = book();

        let err = run(&config, &mut book).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SheetNotFound);
        assert!(matches!(
            err,
            SyncError::SheetNotFound { rule: 0, role: SheetRole::Source, .. }
        ));
        assert_eq!(book.get_sheet("Target").unwrap().value(0, 1), &CellValue::Null);
    }

    #[test]
    fn test_skip_rule_records_failure_and_continues() {
        let config = SyncConfig::from_yaml_str(TWO_RULES).unwrap();
        let mut book = book();

        let report = run_with_options(&config, &mut book, RunOptions::keep_going()).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].rule(), 0);
        assert_eq!(report.rules.len(), 1);
        assert_eq!(report.rules[0].rule, 1);
        assert_eq!(report.cells_written(), 1);
        assert_eq!(
            book.get_sheet("Target").unwrap().get_a1("B1").unwrap(),
            &CellValue::from("v")
        );
    }

    #[test]
    fn test_missing_target_sheet() {
        let config = SyncConfig::from_yaml_str(
            r#"
update_target:
  source: { sheet: 1 }
  target: { sheet: 3, start_row: 1, update_columns: [] }
"#,
        )
        .unwrap();
        let err = run(&config, &mut book()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::SheetNotFound { role: SheetRole::Target, reference: SheetRef::Index(3), .. }
        ));
        assert_eq!(err.to_string(), "update_target[0]: target sheet not found: #3");
    }

    #[test]
    fn test_empty_config() {
        let config = SyncConfig::from_yaml_str("update_target: []").unwrap();
        let report = run(&config, &mut book()).unwrap();
        assert!(report.is_success());
        assert!(report.rules.is_empty());
    }
}
