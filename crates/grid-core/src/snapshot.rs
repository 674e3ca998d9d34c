//! Headless render model.
//!
//! One immutable snapshot of everything a renderer needs for the rows in the virtual window:
//! authoritative values, edit overlays, selection and focus flags, and row layout.

use crate::cell_edit::CellState;
use crate::model::{CellValue, RowKey, TypeHint};
use crate::row_model::SortSpec;
use std::ops::Range;

/// Header of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderColumn {
    /// Column index.
    pub index: usize,
    /// Header text.
    pub name: String,
    /// Type hint.
    pub type_hint: TypeHint,
    /// Sort entry of the column and its rank (0 = most significant).
    pub sort: Option<(usize, SortSpec)>,
    /// Whether a filter is active on the column.
    pub filtered: bool,
}

/// One cell descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCell {
    /// Column index.
    pub column_index: usize,
    /// Authoritative value from the row buffer.
    pub value: CellValue,
    /// Text to display: the edit overlay when present, otherwise the value's text.
    pub text: String,
    /// Edit state (`Ready` without an overlay).
    pub state: CellState,
    /// Error text of the last failed patch, for a tooltip.
    pub error_title: Option<String>,
}

impl RenderCell {
    /// Whether the cell is the one being edited.
    pub fn is_editing(&self) -> bool {
        self.state == CellState::Editing
    }

    /// Whether input to the cell must be refused.
    pub fn is_read_only(&self) -> bool {
        self.state == CellState::EditSaving
    }
}

/// One row descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow {
    /// Position in the row model.
    pub index: usize,
    /// Row identity (dataset row index).
    pub key: RowKey,
    /// Offset of the row's leading edge.
    pub start: f64,
    /// Row size.
    pub size: f64,
    /// Whether the row intersects the viewport (false for overscan rows).
    pub in_viewport: bool,
    /// Selection flag.
    pub selected: bool,
    /// Keyboard focus flag.
    pub focused: bool,
    /// Cells in column order.
    pub cells: Vec<RenderCell>,
}

/// Render snapshot of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderModel {
    /// Grid state version the snapshot was taken at.
    pub version: u64,
    /// Column headers.
    pub columns: Vec<RenderColumn>,
    /// Rows of the virtual window (visible rows plus overscan), in view order.
    pub rows: Vec<RenderRow>,
    /// View positions intersecting the viewport.
    pub visible: Option<Range<usize>>,
    /// Rows in the current view (after filtering).
    pub row_count: usize,
    /// Rows in the dataset.
    pub dataset_row_count: usize,
    /// Total scrollable size.
    pub total_size: f64,
    /// Current scroll offset.
    pub scroll_offset: f64,
    /// Footer summary, when enabled and not every row is visible.
    pub summary: Option<String>,
}

impl RenderModel {
    /// The row with `key`, if it is in the window.
    pub fn row(&self, key: RowKey) -> Option<&RenderRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// The cell at (`key`, `column_index`), if its row is in the window.
    pub fn cell(&self, key: RowKey, column_index: usize) -> Option<&RenderCell> {
        self.row(key)?.cells.get(column_index)
    }

    /// Rows intersecting the viewport.
    pub fn visible_rows(&self) -> impl Iterator<Item = &RenderRow> {
        self.rows.iter().filter(|r| r.in_viewport)
    }
}
