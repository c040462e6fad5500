//! Declarative sync configuration.
//!
//! A [`SyncConfig`] is read-only input: an ordered list of [`UpdateTarget`]
//! rules, each naming a source sheet, a target sheet, a target row range, and
//! the update columns to fill. Coordinates inside a rule are either literal
//! (`"C"`, `3`) or matched by value, which is what makes the config behave
//! like chained `VLOOKUP`s.
//!
//! Two encodings of matched coordinates are accepted:
//!
//! ```yaml
//! # canonical
//! column: { find_in_row: [[1, "ID"]] }
//! row:
//!   find_in_column:
//!     - source_column: A
//!       target_value: { column_for_current_row: A }
//!
//! # historical
//! column: { type: match, rules: [{ row: 1, value: "ID" }] }
//! row:
//!   type: match
//!   rules:
//!     - source_column: A
//!       target_value: { type: current_row, column: A }
//! ```
//!
//! Both deserialize into the same [`Column::Matched`] / [`SourceRow::Matched`]
//! variants; serialization always writes the canonical form.

use crate::error::{ConfigError, ResolveError};
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sheetsync_sheet::{column_number, CellValue, MAX_COLUMNS, MAX_ROWS};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// The kind of synchronization a config performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncType {
    /// Update target cells from values looked up in the source.
    #[default]
    UpdateTarget,
}

/// How a rule's coordinates are described. Only the advanced form exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[default]
    Advanced,
}

/// Top-level sync configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    #[serde(default)]
    pub sync_type: SyncType,
    /// Rules, applied in order. A single rule object is accepted as a
    /// one-element list.
    #[serde(deserialize_with = "one_or_many")]
    pub update_target: Vec<UpdateTarget>,
}

/// One source → target synchronization over a range of target rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTarget {
    #[serde(default)]
    pub rule_type: RuleType,
    pub source: SourceSheet,
    pub target: TargetSpec,
}

/// The sheet values are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSheet {
    pub sheet: SheetRef,
}

/// The sheet values are written to, and which of its cells are updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSpec {
    pub sheet: SheetRef,
    /// First target row (1-based, inclusive).
    pub start_row: u32,
    /// Last target row (1-based, inclusive); `None` runs to the last
    /// populated row of the target sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row: Option<u32>,
    /// Columns to update, in order. Order matters for
    /// [`SourceRow::SameWithPreviousColumn`].
    pub update_columns: Vec<UpdateColumn>,
}

/// One target column and where its value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateColumn {
    /// Column in the target sheet.
    pub column: Column,
    pub source_value_coord: SourceValueCoord,
}

/// A cell in the source sheet, addressed by a row spec and a column spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceValueCoord {
    pub row: SourceRow,
    pub column: Column,
}

/// A sheet addressed by name or by 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetRef {
    Index(u32),
    Name(String),
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRef::Index(index) => write!(f, "#{index}"),
            SheetRef::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl From<&str> for SheetRef {
    fn from(name: &str) -> Self {
        SheetRef::Name(name.to_string())
    }
}

impl From<u32> for SheetRef {
    fn from(index: u32) -> Self {
        SheetRef::Index(index)
    }
}

/// A column, given literally or located by matching cell values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Column letters, e.g. `"C"` or `"AA"` (case-insensitive).
    Letters(String),
    /// 1-based column index. Kept signed so that `0` and negatives surface
    /// as invalid references at resolution time.
    Index(i64),
    /// The lowest-index column whose cell at each constraint's row equals
    /// the constraint's value. An empty list matches no column.
    Matched(Vec<CellConstraint>),
}

/// A `(row, expected value)` pair used to locate a column.
#[derive(Debug, Clone, PartialEq)]
pub struct CellConstraint {
    pub row: u32,
    pub value: CellValue,
}

/// A source row: reused from the previous update column or matched.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRow {
    /// The source row resolved for the preceding update column in the same
    /// target row.
    SameWithPreviousColumn,
    /// The first source row satisfying every criterion. An empty list
    /// matches no row.
    Matched(Vec<RowCriterion>),
}

/// One lookup criterion: the source cell in `source_column` must equal
/// `target_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RowCriterion {
    pub source_column: Column,
    pub target_value: TargetValue,
}

/// The value a [`RowCriterion`] looks up.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetValue {
    /// The target cell at (current target row, this column).
    CurrentRow(Column),
    /// The target cell at (this fixed row, current update column).
    CurrentColumn(u32),
    /// A literal value.
    Literal(CellValue),
}

impl Column {
    /// Resolve a literal column without looking at any sheet.
    ///
    /// Returns `None` for matched columns, which need sheet content.
    /// Columns past XFD are invalid references.
    pub fn literal_index(&self) -> Option<Result<u32, ResolveError>> {
        match self {
            Column::Letters(letters) => Some(
                column_number(letters)
                    .ok()
                    .filter(|c| *c <= MAX_COLUMNS)
                    .ok_or_else(|| {
                        ResolveError::InvalidReference(format!("column letters {letters:?}"))
                    }),
            ),
            Column::Index(index) => Some(
                u32::try_from(*index)
                    .ok()
                    .filter(|i| (1..=MAX_COLUMNS).contains(i))
                    .ok_or_else(|| ResolveError::InvalidReference(format!("column index {index}"))),
            ),
            Column::Matched(_) => None,
        }
    }
}

impl From<&str> for Column {
    fn from(letters: &str) -> Self {
        Column::Letters(letters.to_string())
    }
}

impl From<i64> for Column {
    fn from(index: i64) -> Self {
        Column::Index(index)
    }
}

/// Render a value for diagnostics: text quoted, empty spelled out, other
/// values tagged with their type so `"42"` and `42 (number)` read apart.
pub(crate) fn describe_value(value: &CellValue) -> String {
    match value {
        CellValue::Null => "empty".to_string(),
        CellValue::String(s) => format!("{s:?}"),
        other => format!("{other} ({})", other.type_name()),
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Column::Letters(letters) => write!(f, "{letters}"),
            Column::Index(index) => write!(f, "{index}"),
            Column::Matched(constraints) => {
                write!(f, "find_in_row [")?;
                for (i, c) in constraints.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "row {} = {}", c.row, describe_value(&c.value))?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetValue::CurrentRow(column) => write!(f, "target[current row, {column}]"),
            TargetValue::CurrentColumn(row) => write!(f, "target[row {row}, current column]"),
            TargetValue::Literal(value) => write!(f, "{}", describe_value(value)),
        }
    }
}

// ===== Loading =====

impl SyncConfig {
    /// Parse a config from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a config from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file. `.json` files are parsed as JSON, anything else
    /// as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Serialize to YAML in the canonical encoding.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize to pretty JSON in the canonical encoding.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // ===== Validation =====

    /// Check the config for defects that do not depend on sheet content.
    ///
    /// Empty `find_in_row` / `find_in_column` lists are accepted here; they
    /// fail when resolved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, rule) in self.update_target.iter().enumerate() {
            rule.validate(&format!("update_target[{index}]"))?;
        }
        Ok(())
    }
}

impl UpdateTarget {
    fn validate(&self, path: &str) -> Result<(), ConfigError> {
        validate_sheet(&self.source.sheet, &format!("{path}.source.sheet"))?;

        let target = &self.target;
        validate_sheet(&target.sheet, &format!("{path}.target.sheet"))?;

        if target.start_row == 0 {
            return Err(ConfigError::invalid(
                format!("{path}.target.start_row"),
                ResolveError::InvalidReference("start_row must be at least 1".to_string()),
            ));
        }
        for (field, row) in [("start_row", Some(target.start_row)), ("end_row", target.end_row)] {
            if row.is_some_and(|row| row > MAX_ROWS) {
                return Err(ConfigError::invalid(
                    format!("{path}.target.{field}"),
                    ResolveError::InvalidReference(format!("{field} must be at most {MAX_ROWS}")),
                ));
            }
        }
        if let Some(end) = target.end_row {
            if end < target.start_row {
                return Err(ConfigError::InvalidRange {
                    path: format!("{path}.target"),
                    start: target.start_row,
                    end,
                });
            }
        }

        for (index, update) in target.update_columns.iter().enumerate() {
            let path = format!("{path}.target.update_columns[{index}]");
            validate_column(&update.column, &format!("{path}.column"))?;

            let coord = &update.source_value_coord;
            validate_column(&coord.column, &format!("{path}.source_value_coord.column"))?;

            let row_path = format!("{path}.source_value_coord.row");
            match &coord.row {
                SourceRow::SameWithPreviousColumn if index == 0 => {
                    return Err(ConfigError::invalid(row_path, ResolveError::NoPreviousColumn));
                }
                SourceRow::SameWithPreviousColumn => {}
                SourceRow::Matched(criteria) => {
                    for (i, criterion) in criteria.iter().enumerate() {
                        let path = format!("{row_path}.find_in_column[{i}]");
                        validate_column(
                            &criterion.source_column,
                            &format!("{path}.source_column"),
                        )?;
                        match &criterion.target_value {
                            TargetValue::CurrentRow(column) => {
                                validate_column(column, &format!("{path}.target_value"))?;
                            }
                            TargetValue::CurrentColumn(0) => {
                                return Err(ConfigError::invalid(
                                    format!("{path}.target_value"),
                                    ResolveError::InvalidReference("row 0".to_string()),
                                ));
                            }
                            TargetValue::CurrentColumn(_) | TargetValue::Literal(_) => {}
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_sheet(sheet: &SheetRef, path: &str) -> Result<(), ConfigError> {
    if *sheet == SheetRef::Index(0) {
        return Err(ConfigError::invalid(
            path,
            ResolveError::InvalidReference("sheet index 0 (indices are 1-based)".to_string()),
        ));
    }
    Ok(())
}

fn validate_column(column: &Column, path: &str) -> Result<(), ConfigError> {
    match column {
        Column::Matched(constraints) => {
            if let Some(i) = constraints.iter().position(|c| c.row == 0) {
                return Err(ConfigError::invalid(
                    format!("{path}.find_in_row[{i}]"),
                    ResolveError::InvalidReference("row 0".to_string()),
                ));
            }
            Ok(())
        }
        literal => match literal.literal_index() {
            Some(Err(err)) => Err(ConfigError::invalid(path, err)),
            _ => Ok(()),
        },
    }
}

// ===== Serde =====

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OneOrMany<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrMany<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a rule or a list of rules")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Vec<T>, A::Error> {
            Vec::deserialize(SeqAccessDeserializer::new(seq))
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Vec<T>, A::Error> {
            T::deserialize(MapAccessDeserializer::new(map)).map(|rule| vec![rule])
        }
    }

    deserializer.deserialize_any(OneOrMany(PhantomData))
}

/// `type: match` marker of the historical encoding.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum MatchMarker {
    Match,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstraintRule {
    row: u32,
    value: CellValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchedColumnRepr {
    #[serde(rename = "type")]
    kind: Option<MatchMarker>,
    rules: Option<Vec<ConstraintRule>>,
    find_in_row: Option<Vec<(u32, CellValue)>>,
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnVisitor;

        impl<'de> Visitor<'de> for ColumnVisitor {
            type Value = Column;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("column letters, a 1-based column index, or a find_in_row matcher")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Column, E> {
                Ok(Column::Letters(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Column, E> {
                Ok(Column::Index(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Column, E> {
                i64::try_from(v)
                    .map(Column::Index)
                    .map_err(|_| E::custom(format!("column index {v} is out of range")))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Column, A::Error> {
                let repr = MatchedColumnRepr::deserialize(MapAccessDeserializer::new(map))?;
                match (repr.find_in_row, repr.kind, repr.rules) {
                    (Some(pairs), None, None) => Ok(Column::Matched(
                        pairs
                            .into_iter()
                            .map(|(row, value)| CellConstraint { row, value })
                            .collect(),
                    )),
                    (None, Some(MatchMarker::Match), rules) => Ok(Column::Matched(
                        rules
                            .unwrap_or_default()
                            .into_iter()
                            .map(|r| CellConstraint {
                                row: r.row,
                                value: r.value,
                            })
                            .collect(),
                    )),
                    _ => Err(de::Error::custom(
                        "expected either `find_in_row` or `type: match` with `rules`",
                    )),
                }
            }
        }

        deserializer.deserialize_any(ColumnVisitor)
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Pairs<'a>(&'a [CellConstraint]);

        impl Serialize for Pairs<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for c in self.0 {
                    seq.serialize_element(&(c.row, &c.value))?;
                }
                seq.end()
            }
        }

        match self {
            Column::Letters(letters) => serializer.serialize_str(letters),
            Column::Index(index) => serializer.serialize_i64(*index),
            Column::Matched(constraints) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("find_in_row", &Pairs(constraints))?;
                map.end()
            }
        }
    }
}

const SAME_WITH_PREVIOUS_COLUMN: &str = "same_with_previous_column";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MatchedRowRepr {
    #[serde(rename = "type")]
    kind: Option<MatchMarker>,
    rules: Option<Vec<RowCriterion>>,
    find_in_column: Option<Vec<RowCriterion>>,
}

impl<'de> Deserialize<'de> for SourceRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourceRowVisitor;

        impl<'de> Visitor<'de> for SourceRowVisitor {
            type Value = SourceRow;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "`{SAME_WITH_PREVIOUS_COLUMN}` or a find_in_column matcher")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SourceRow, E> {
                if v == SAME_WITH_PREVIOUS_COLUMN {
                    Ok(SourceRow::SameWithPreviousColumn)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<SourceRow, A::Error> {
                let repr = MatchedRowRepr::deserialize(MapAccessDeserializer::new(map))?;
                match (repr.find_in_column, repr.kind, repr.rules) {
                    (Some(criteria), None, None) => Ok(SourceRow::Matched(criteria)),
                    (None, Some(MatchMarker::Match), rules) => {
                        Ok(SourceRow::Matched(rules.unwrap_or_default()))
                    }
                    _ => Err(de::Error::custom(
                        "expected either `find_in_column` or `type: match` with `rules`",
                    )),
                }
            }
        }

        deserializer.deserialize_any(SourceRowVisitor)
    }
}

impl Serialize for SourceRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceRow::SameWithPreviousColumn => {
                serializer.serialize_str(SAME_WITH_PREVIOUS_COLUMN)
            }
            SourceRow::Matched(criteria) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("find_in_column", criteria)?;
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TargetValueKind {
    CurrentRow,
    CurrentColumn,
    Fixed,
}

/// Deserialize a present field as `Some`, even when its value is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CellValue>, D::Error> {
    CellValue::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetValueRepr {
    #[serde(rename = "type")]
    kind: Option<TargetValueKind>,
    column: Option<Column>,
    row: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    value: Option<CellValue>,
    column_for_current_row: Option<Column>,
    row_for_current_column: Option<u32>,
}

impl TargetValueRepr {
    fn into_target_value(self) -> Option<TargetValue> {
        use TargetValueKind::{CurrentColumn, CurrentRow, Fixed};

        match (
            self.kind,
            self.column,
            self.row,
            self.value,
            self.column_for_current_row,
            self.row_for_current_column,
        ) {
            (None, None, None, None, Some(c), None)
            | (Some(CurrentRow), Some(c), None, None, None, None) => {
                Some(TargetValue::CurrentRow(c))
            }
            (None, None, None, None, None, Some(r))
            | (Some(CurrentColumn), None, Some(r), None, None, None) => {
                Some(TargetValue::CurrentColumn(r))
            }
            (None | Some(Fixed), None, None, Some(v), None, None) => Some(TargetValue::Literal(v)),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for TargetValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TargetValueRepr::deserialize(deserializer)?
            .into_target_value()
            .ok_or_else(|| {
                de::Error::custom(
                    "expected exactly one of `column_for_current_row`, \
                     `row_for_current_column`, or `value`",
                )
            })
    }
}

impl Serialize for TargetValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            TargetValue::CurrentRow(column) => {
                map.serialize_entry("column_for_current_row", column)?;
            }
            TargetValue::CurrentColumn(row) => map.serialize_entry("row_for_current_column", row)?,
            TargetValue::Literal(value) => map.serialize_entry("value", value)?,
        }
        map.end()
    }
}
