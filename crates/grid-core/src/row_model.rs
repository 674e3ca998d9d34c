//! Sorting and filtering: the row model.
//!
//! The row model is the filtered, then stably sorted, sequence of dataset rows. It is the "view
//! order" every other component talks about: selection ranges, focus movement and the
//! virtualizer all index into it.

use crate::error::GridError;
use crate::model::{CellValue, Column, RowKey, cell_number, cell_text};
use crate::selection::RowOrder;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One sort entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column index.
    pub column: usize,
    /// Whether the column sorts descending.
    pub descending: bool,
}

/// Ordered sort entries; the first entry is the most significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    specs: Vec<SortSpec>,
}

impl SortState {
    /// No sorting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by the given entries, in order. Later duplicates of a column are dropped.
    pub fn from_specs<I: IntoIterator<Item = SortSpec>>(specs: I) -> Self {
        let mut state = Self::new();
        for spec in specs {
            if state.get(spec.column).is_none() {
                state.specs.push(spec);
            }
        }
        state
    }

    /// The entries, most significant first.
    pub fn specs(&self) -> &[SortSpec] {
        &self.specs
    }

    /// Whether nothing is sorted.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The entry for `column`.
    pub fn get(&self, column: usize) -> Option<SortSpec> {
        self.specs.iter().copied().find(|s| s.column == column)
    }

    /// Cycle `column` through first direction, flipped direction and unsorted.
    ///
    /// Numeric columns start descending, everything else ascending. Without `multi` the column
    /// replaces the whole sort; with `multi` it is updated in place or appended. Returns `false`
    /// for non-sortable columns.
    pub fn toggle(&mut self, column: &Column, multi: bool) -> bool {
        if !column.sortable {
            return false;
        }
        let first_descending = column.type_hint.is_numeric();
        let position = self.specs.iter().position(|s| s.column == column.index);
        let next = match position.map(|i| self.specs[i]) {
            None => Some(SortSpec {
                column: column.index,
                descending: first_descending,
            }),
            Some(spec) if spec.descending == first_descending => Some(SortSpec {
                descending: !spec.descending,
                ..spec
            }),
            Some(_) => None,
        };

        if !multi {
            self.specs = next.into_iter().collect();
            return true;
        }
        match (position, next) {
            (Some(i), Some(spec)) => self.specs[i] = spec,
            (Some(i), None) => {
                self.specs.remove(i);
            }
            (None, Some(spec)) => self.specs.push(spec),
            (None, None) => {}
        }
        true
    }

    /// Keep only entries accepted by `keep`.
    pub fn retain<F: FnMut(&SortSpec) -> bool>(&mut self, keep: F) {
        self.specs.retain(keep);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.specs.clear();
    }
}

/// Filter condition of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum FilterValue {
    /// Case-insensitive substring of the display text.
    Text {
        /// Needle.
        text: String,
    },
    /// Inclusive numeric range; a missing bound is open.
    Range {
        /// Lower bound.
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound.
        #[serde(default)]
        max: Option<f64>,
    },
}

impl FilterValue {
    /// Text filter.
    pub fn text(text: impl Into<String>) -> Self {
        FilterValue::Text { text: text.into() }
    }

    /// Range filter.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range { min, max }
    }

    /// Whether `value` passes the filter.
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            FilterValue::Text { text } => {
                text.is_empty() || cell_text(value).to_lowercase().contains(&text.to_lowercase())
            }
            FilterValue::Range { min, max } => match cell_number(value) {
                Some(n) => min.is_none_or(|lo| n >= lo) && max.is_none_or(|hi| n <= hi),
                None => false,
            },
        }
    }

    /// Whether the filter kind fits `column` (ranges on numeric columns, text on the rest).
    pub fn fits(&self, column: &Column) -> bool {
        match self {
            FilterValue::Range { .. } => column.type_hint.is_numeric(),
            FilterValue::Text { .. } => !column.type_hint.is_numeric(),
        }
    }
}

/// A filter bound to a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Column index.
    pub column: usize,
    /// Condition.
    pub value: FilterValue,
}

impl ColumnFilter {
    /// Create a column filter.
    pub fn new(column: usize, value: FilterValue) -> Self {
        Self { column, value }
    }
}

/// Check a filter list against the column set.
pub fn validate_filters(columns: &[Column], filters: &[ColumnFilter]) -> Result<(), GridError> {
    for filter in filters {
        let column = columns
            .get(filter.column)
            .ok_or(GridError::UnknownColumn(filter.column))?;
        if !column.filterable {
            return Err(GridError::NotFilterable(filter.column));
        }
    }
    Ok(())
}

fn compare_values(a: &CellValue, b: &CellValue, numeric: bool) -> Ordering {
    let both_numbers = a.is_number() && b.is_number();
    if numeric || both_numbers {
        match (cell_number(a), cell_number(b)) {
            (Some(x), Some(y)) => return x.total_cmp(&y),
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => {}
        }
    }
    cell_text(a).cmp(&cell_text(b))
}

/// The current view order over the bound dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowModel {
    keys: Vec<RowKey>,
    positions: Vec<Option<usize>>,
}

impl RowModel {
    /// Every row of a `len`-row dataset, in storage order.
    pub fn identity(len: usize) -> Self {
        Self {
            keys: (0..len).map(RowKey).collect(),
            positions: (0..len).map(Some).collect(),
        }
    }

    /// Filter then stably sort `data`.
    pub fn build(
        columns: &[Column],
        data: &[Vec<CellValue>],
        sort: &SortState,
        filters: &[ColumnFilter],
    ) -> Self {
        let mut indexes: Vec<usize> = (0..data.len())
            .filter(|&i| {
                filters.iter().all(|f| match columns.get(f.column) {
                    Some(column) => f.value.matches(column.value(&data[i])),
                    None => true,
                })
            })
            .collect();

        let specs: Vec<(&Column, bool)> = sort
            .specs()
            .iter()
            .filter_map(|s| columns.get(s.column).map(|c| (c, s.descending)))
            .collect();
        if !specs.is_empty() {
            indexes.sort_by(|&a, &b| {
                for &(column, descending) in &specs {
                    let (va, vb) = (column.value(&data[a]), column.value(&data[b]));
                    let ordering = match (va.is_null(), vb.is_null()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        (false, false) => {
                            let ordering = compare_values(va, vb, column.type_hint.is_numeric());
                            if descending { ordering.reverse() } else { ordering }
                        }
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let mut positions = vec![None; data.len()];
        for (position, &index) in indexes.iter().enumerate() {
            positions[index] = Some(position);
        }
        Self {
            keys: indexes.into_iter().map(RowKey).collect(),
            positions,
        }
    }

    /// Number of rows in view.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in view order.
    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// Key at view position `position`.
    pub fn key_at(&self, position: usize) -> Option<RowKey> {
        self.keys.get(position).copied()
    }

    /// View position of `key`, if the row passes the filters.
    pub fn position(&self, key: RowKey) -> Option<usize> {
        self.positions.get(key.get()).copied().flatten()
    }

    /// Whether `key` is in view.
    pub fn contains(&self, key: RowKey) -> bool {
        self.position(key).is_some()
    }

    /// Dataset row indexes in view order.
    pub fn data_view_rows(&self) -> Vec<usize> {
        self.keys.iter().map(|k| k.get()).collect()
    }
}

impl RowOrder<RowKey> for RowModel {
    fn between(&self, from: &RowKey, to: &RowKey) -> Vec<RowKey> {
        let (Some(a), Some(b)) = (self.position(*from), self.position(*to)) else {
            return Vec::new();
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.keys[lo..=hi].to_vec()
    }

    fn focus_offset(&self, key: &RowKey, offset: isize) -> Option<RowKey> {
        let position = self.position(*key)?;
        let target = position.checked_add_signed(offset)?;
        self.key_at(target)
    }
}
