//! Coordinate resolution.
//!
//! Turns [`Column`] and [`SourceRow`] specs into concrete 1-based indices.
//! Literal columns resolve without looking at a sheet; matched columns and
//! rows scan the sheet in ascending order and take the first hit. All state
//! a resolution depends on besides sheet content travels in a
//! [`ResolveContext`], so resolving the same spec against the same sheets
//! and context always yields the same result.

use crate::config::{describe_value, CellConstraint, Column, RowCriterion, SourceRow, TargetValue};
use crate::error::ResolveError;
use crate::workbook::Workbook;
use sheetsync_sheet::CellValue;

/// Where the executor currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveContext {
    /// Target row being updated (1-based).
    pub target_row: u32,
    /// Target column being updated (1-based).
    pub target_column: u32,
    /// Source row resolved for the previous update column in this target
    /// row, if any.
    pub previous_source_row: Option<u32>,
}

impl ResolveContext {
    /// Context for the first update column of a target row.
    pub fn for_row(target_row: u32) -> Self {
        Self {
            target_row,
            ..Self::default()
        }
    }
}

/// Resolves coordinates against one workbook.
///
/// `target` is the sheet that `column_for_current_row` and
/// `row_for_current_column` lookups read from.
pub struct Resolver<'a, W: Workbook + ?Sized> {
    workbook: &'a W,
    target: W::Sheet,
}

impl<'a, W: Workbook + ?Sized> Resolver<'a, W> {
    pub fn new(workbook: &'a W, target: W::Sheet) -> Self {
        Self { workbook, target }
    }

    /// Resolve a column spec against `sheet`.
    pub fn resolve_column(&self, sheet: W::Sheet, spec: &Column) -> Result<u32, ResolveError> {
        match (spec, spec.literal_index()) {
            (_, Some(index)) => index,
            (Column::Matched(constraints), None) => self.find_column(sheet, constraints),
            (_, None) => Err(ResolveError::InvalidReference(spec.to_string())),
        }
    }

    /// Resolve a source-row spec against `sheet`.
    pub fn resolve_row(
        &self,
        sheet: W::Sheet,
        spec: &SourceRow,
        ctx: &ResolveContext,
    ) -> Result<u32, ResolveError> {
        match spec {
            SourceRow::SameWithPreviousColumn => {
                ctx.previous_source_row.ok_or(ResolveError::NoPreviousColumn)
            }
            SourceRow::Matched(criteria) => self.find_row(sheet, criteria, ctx),
        }
    }

    /// Resolve the value a criterion looks up.
    pub fn resolve_target_value<'v>(
        &self,
        value: &'v TargetValue,
        ctx: &ResolveContext,
    ) -> Result<&'v CellValue, ResolveError>
    where
        'a: 'v,
    {
        match value {
            TargetValue::CurrentRow(column) => {
                let column = self.resolve_column(self.target, column)?;
                Ok(self.workbook.read_cell(self.target, ctx.target_row, column))
            }
            TargetValue::CurrentColumn(0) => {
                Err(ResolveError::InvalidReference("row 0".to_string()))
            }
            TargetValue::CurrentColumn(row) => {
                Ok(self.workbook.read_cell(self.target, *row, ctx.target_column))
            }
            TargetValue::Literal(value) => Ok(value),
        }
    }

    fn find_column(
        &self,
        sheet: W::Sheet,
        constraints: &[CellConstraint],
    ) -> Result<u32, ResolveError> {
        if let Some(c) = constraints.iter().find(|c| c.row == 0) {
            return Err(ResolveError::InvalidReference(format!(
                "row 0 in constraint {}",
                describe_value(&c.value)
            )));
        }

        let not_found = || ResolveError::ColumnNotFound {
            constraints: Column::Matched(constraints.to_vec()).to_string(),
        };
        if constraints.is_empty() {
            return Err(not_found());
        }

        (1..=self.workbook.last_populated_column(sheet))
            .find(|&col| {
                constraints
                    .iter()
                    .all(|c| self.workbook.read_cell(sheet, c.row, col).matches(&c.value))
            })
            .ok_or_else(not_found)
    }

    fn find_row(
        &self,
        sheet: W::Sheet,
        criteria: &[RowCriterion],
        ctx: &ResolveContext,
    ) -> Result<u32, ResolveError> {
        // Resolve every criterion once, before scanning
        let resolved = criteria
            .iter()
            .map(|c| {
                let column = self.resolve_column(sheet, &c.source_column)?;
                let value = self.resolve_target_value(&c.target_value, ctx)?;
                Ok((column, value))
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;

        if !resolved.is_empty() {
            let found = (1..=self.workbook.last_populated_row(sheet)).find(|&row| {
                resolved
                    .iter()
                    .all(|(col, value)| self.workbook.read_cell(sheet, row, *col).matches(value))
            });
            if let Some(row) = found {
                return Ok(row);
            }
        }

        let criteria = resolved
            .iter()
            .zip(criteria)
            .map(|((col, value), c)| match c.target_value {
                TargetValue::Literal(_) => format!("column {col} = {}", describe_value(value)),
                ref lookup => format!("column {col} = {} from {lookup}", describe_value(value)),
            })
            .collect::<Vec<_>>();
        Err(ResolveError::RowNotFound {
            criteria: format!("find_in_column [{}]", criteria.join(", ")),
        })
    }
}
