//! Grid data model: rows, columns, keys and selection modes.
//!
//! Cell values are opaque JSON values. The engine never coerces them; it only needs their
//! display text (for edit comparison and text filters) and a numeric view (for sorting and
//! range filters).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque cell value as supplied by (and returned to) the authority.
pub type CellValue = serde_json::Value;

static NULL_VALUE: CellValue = CellValue::Null;

/// Text shown for a cell value, and the text an edit buffer starts from.
///
/// `null` renders as an empty string, strings render verbatim and everything else renders as
/// its JSON form (so `7` becomes `"7"` and `true` becomes `"true"`).
pub fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric view of a cell value (numbers, and strings that parse as numbers).
pub fn cell_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => n.as_f64(),
        CellValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Stable row identity, independent of sort/filter position.
///
/// Keys are assigned from the row's position in the bound dataset, so they survive sorting and
/// filtering but not a dataset swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey(pub usize);

impl RowKey {
    /// The dataset row index this key was assigned from.
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key of a single cell, in dataset (not view) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EditKey {
    /// Dataset row index.
    pub row_index: usize,
    /// Column index.
    pub column_index: usize,
}

impl EditKey {
    /// Create a cell key.
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }
}

impl fmt::Display for EditKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row_index, self.column_index)
    }
}

/// Per-column type hint supplied by the host.
///
/// Unrecognised `type` strings deserialize as [`TypeHint::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeHint {
    /// Free text.
    String,
    /// Numbers; sorts numerically and filters by range.
    Numeric,
    /// A fixed set of categories.
    Categorical {
        /// The allowed categories, in display order.
        #[serde(default)]
        categories: Vec<String>,
    },
    /// Anything else.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TypeHint {
    /// Whether the column holds numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeHint::Numeric)
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Position of the column in every row's value tuple.
    pub index: usize,
    /// Header text.
    pub name: String,
    /// Type hint.
    pub type_hint: TypeHint,
    /// Whether the column can be sorted.
    pub sortable: bool,
    /// Whether the column can be filtered.
    pub filterable: bool,
}

impl Column {
    /// Create a sortable, filterable column.
    pub fn new(index: usize, name: impl Into<String>, type_hint: TypeHint) -> Self {
        Self {
            index,
            name: name.into(),
            type_hint,
            sortable: true,
            filterable: true,
        }
    }

    /// Accessor: this column's value within a row tuple (`null` for short rows).
    pub fn value<'a>(&self, values: &'a [CellValue]) -> &'a CellValue {
        values.get(self.index).unwrap_or(&NULL_VALUE)
    }
}

/// Row selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSelectionMode {
    /// Rows cannot be selected.
    None,
    /// At most one row is selected.
    Single,
    /// Any number of rows may be selected.
    #[default]
    Multiple,
}

/// Column selection mode (reserved; no behavior is attached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColSelectionMode {
    /// Columns cannot be selected.
    #[default]
    None,
    /// Reserved.
    Single,
    /// Reserved.
    Multiple,
}

/// Rectangular selection mode (reserved; no behavior is attached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RectSelectionMode {
    /// No rectangular selection.
    #[default]
    None,
    /// Reserved.
    Cell,
    /// Reserved.
    Region,
}

/// Selection-mode descriptor (`row`, plus the reserved `col`/`rect` axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionModes {
    /// Row selection mode.
    #[serde(default)]
    pub row: RowSelectionMode,
    /// Reserved column selection mode.
    #[serde(default)]
    pub col: ColSelectionMode,
    /// Reserved rectangular selection mode.
    #[serde(default)]
    pub rect: RectSelectionMode,
}

impl SelectionModes {
    /// Selection modes with only the row axis set.
    pub fn rows(row: RowSelectionMode) -> Self {
        Self {
            row,
            ..Self::default()
        }
    }

    /// Whether every axis is disabled.
    pub fn is_none(&self) -> bool {
        self.row == RowSelectionMode::None
            && self.col == ColSelectionMode::None
            && self.rect == RectSelectionMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("abc")), "abc");
        assert_eq!(cell_text(&json!(7)), "7");
        assert_eq!(cell_text(&json!(1.5)), "1.5");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn test_cell_number() {
        assert_eq!(cell_number(&json!(3)), Some(3.0));
        assert_eq!(cell_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(cell_number(&json!("x")), None);
        assert_eq!(cell_number(&json!(null)), None);
    }

    #[test]
    fn test_type_hint_deserialize() {
        let hints: Vec<TypeHint> = serde_json::from_value(json!([
            {"type": "string"},
            {"type": "numeric"},
            {"type": "categorical", "categories": ["a", "b"]},
            {"type": "unknown"},
            {"type": "html"}
        ]))
        .unwrap();

        assert_eq!(
            hints,
            vec![
                TypeHint::String,
                TypeHint::Numeric,
                TypeHint::Categorical {
                    categories: vec!["a".to_string(), "b".to_string()]
                },
                TypeHint::Unknown,
                TypeHint::Unknown,
            ]
        );
    }

    #[test]
    fn test_column_accessor_pads_short_rows() {
        let column = Column::new(2, "c", TypeHint::Unknown);
        let row = vec![json!(1), json!(2)];
        assert_eq!(column.value(&row), &CellValue::Null);
    }

    #[test]
    fn test_selection_modes_default_is_multiple_rows() {
        let modes: SelectionModes = serde_json::from_value(json!({})).unwrap();
        assert_eq!(modes.row, RowSelectionMode::Multiple);
        assert!(!modes.is_none());
        assert!(SelectionModes::rows(RowSelectionMode::None).is_none());
    }
}
