//! Grid controller: one consistent grid instance.
//!
//! # Overview
//!
//! [`GridController`] owns the row buffer, the row model (sort + filter), the selection, the
//! edit overlays, the patch bookkeeping and the virtualizer, and keeps them consistent with each
//! other. Hosts drive it with intents and read it back through [`GridController::render_model`].
//!
//! The only signal a grid publishes on its own is the selection, as a sorted list of dataset
//! row indexes delivered to [`subscribe`](GridController::subscribe)d callbacks. Edits leave the
//! grid only as patch requests.
//!
//! # Example
//!
//! ```rust
//! use grid_core::{CellState, CommitTrigger, EditIntent, EditKey, GridController, GridInfo, PatchReply};
//! use serde_json::json;
//!
//! let info = GridInfo::from_json(r#"{
//!     "payload": {
//!         "columns": ["name", "qty"],
//!         "data": [["a", 5], ["b", 6]],
//!         "options": {"editable": true}
//!     },
//!     "patchInfo": {"key": "edit"}
//! }"#).unwrap();
//! let mut grid = GridController::new(info).unwrap();
//!
//! grid.dispatch_edit(EditIntent::Activate(EditKey::new(0, 1))).unwrap();
//! grid.dispatch_edit(EditIntent::Input("7".to_string())).unwrap();
//! grid.dispatch_edit(EditIntent::Commit(CommitTrigger::Escape)).unwrap();
//!
//! let request = grid.take_patch_requests().remove(0);
//! grid.resolve_patch(PatchReply::accepted(
//!     request.ticket,
//!     json!([{"row_index": 0, "column_index": 1, "value": 7}]),
//! ));
//!
//! assert_eq!(grid.cell_value(0, 1), Some(&json!(7)));
//! assert_eq!(grid.cell_state(EditKey::new(0, 1)), CellState::EditSuccess);
//! ```

use crate::cell_edit::{CellEditRecord, CellEditStore, CellState, CommitOutcome};
use crate::config::{GridInfo, GridOptions, build_columns, validate_type_hints};
use crate::error::{EditError, GridError};
use crate::model::{
    CellValue, Column, EditKey, RowKey, RowSelectionMode, SelectionModes, TypeHint, cell_text,
};
use crate::patch::{Patch, PatchAuthority, PatchProtocol, PatchReply, PatchRequest, PatchResolution};
use crate::row_model::{ColumnFilter, RowModel, SortSpec, SortState, validate_filters};
use crate::selection::{
    Platform, SelectionContext, SelectionController, SelectionIntent, SelectionOutcome,
};
use crate::snapshot::{RenderCell, RenderColumn, RenderModel, RenderRow};
use crate::summary::summary_text;
use crate::virtualizer::{ScrollAlign, Virtualizer};
use std::sync::Arc;

/// How an edit was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitTrigger {
    /// Escape key.
    Escape,
    /// The editor lost focus (for example a click on another row).
    Blur,
    /// Tab key: continue editing in the adjacent column of the same row.
    Tab {
        /// Shift held: move left instead of right.
        reverse: bool,
    },
    /// Enter key: continue editing in the adjacent row of the same column.
    Enter {
        /// Shift held: move up instead of down.
        reverse: bool,
    },
}

/// Captured edit input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditIntent {
    /// Start editing a cell.
    Activate(EditKey),
    /// Replace the edit buffer.
    Input(String),
    /// Commit the editing cell.
    Commit(CommitTrigger),
    /// Leave editing without committing.
    Cancel,
}

/// Selection published to hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// Selected dataset row indexes that are in the current view, ascending.
    pub rows: Vec<usize>,
    /// Grid version after the change.
    pub version: u64,
}

/// Selection change callback function type
pub type SelectionChangeCallback = Box<dyn FnMut(&SelectionChange) + Send>;

/// A grid instance.
pub struct GridController {
    columns: Vec<Column>,
    data: Arc<Vec<Vec<CellValue>>>,
    options: GridOptions,
    modes: SelectionModes,
    generation: u64,
    sort: SortState,
    filters: Vec<ColumnFilter>,
    row_model: RowModel,
    selection: SelectionController<RowKey>,
    edits: CellEditStore,
    patches: PatchProtocol,
    virtualizer: Virtualizer,
    version: u64,
    callbacks: Vec<SelectionChangeCallback>,
}

impl GridController {
    /// Bind a validated configuration.
    pub fn new(info: GridInfo) -> Result<Self, GridError> {
        Self::with_platform(info, Platform::current())
    }

    /// Bind a configuration, remapping modifiers for `platform`.
    pub fn with_platform(info: GridInfo, platform: Platform) -> Result<Self, GridError> {
        info.validate()?;
        let options = info.payload.options.clone();
        let mut grid = Self {
            columns: Vec::new(),
            data: Arc::new(Vec::new()),
            options: options.clone(),
            modes: info.selection_modes,
            generation: 0,
            sort: SortState::new(),
            filters: Vec::new(),
            row_model: RowModel::default(),
            selection: SelectionController::new(info.selection_modes.row, platform),
            edits: CellEditStore::new(),
            patches: PatchProtocol::default(),
            virtualizer: Virtualizer::new(options.virtualizer_options()),
            version: 0,
            callbacks: Vec::new(),
        };
        grid.bind(info);
        Ok(grid)
    }

    /// Parse a JSON configuration and bind it.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        Self::new(GridInfo::from_json(json)?)
    }

    fn bind(&mut self, info: GridInfo) {
        if info.payload.options.editable && info.selection_modes.row != RowSelectionMode::None {
            tracing::debug!("editable grid with row selection enabled");
        }
        let method = info
            .patch_info
            .as_ref()
            .map(|p| p.key.clone())
            .unwrap_or_default();
        self.columns = info.columns();
        self.data = Arc::new(info.payload.data);
        self.options = info.payload.options;
        self.modes = info.selection_modes;
        self.sort.clear();
        self.filters.clear();
        self.selection.set_mode(self.modes.row);
        self.edits.reset();
        self.patches = PatchProtocol::new(method);
        self.patches.reset(self.generation);
        let viewport = self.virtualizer.viewport();
        self.virtualizer = Virtualizer::new(self.options.virtualizer_options());
        self.virtualizer.set_viewport(viewport);
        self.rebuild_rows();
        self.virtualizer.set_scroll_offset(0.0);
    }

    /// Swap in a new dataset.
    ///
    /// Sort, filters, selection, edit records and pending patches are dropped and the scroll
    /// offset returns to 0 before the new rows are bound. Replies to patches issued against the
    /// old dataset are ignored when they arrive.
    pub fn replace_dataset(&mut self, info: GridInfo) -> Result<(), GridError> {
        info.validate()?;
        let had_selection = !self.selection.selected().is_empty();
        self.generation += 1;
        self.bind(info);
        tracing::debug!(
            generation = self.generation,
            rows = self.data.len(),
            columns = self.columns.len(),
            "dataset replaced"
        );
        self.touch();
        if had_selection {
            self.notify_selection();
        }
        Ok(())
    }

    /// Refresh the rows in place without a dataset swap.
    ///
    /// Edit records are dropped. Sort entries and filters survive when their column still exists
    /// and still fits the filter kind; the selection is pruned to rows that still exist. The
    /// scroll offset is kept (clamped to the new size).
    pub fn update_data(
        &mut self,
        columns: Vec<String>,
        type_hints: Vec<TypeHint>,
        data: Vec<Vec<CellValue>>,
    ) -> Result<(), GridError> {
        validate_type_hints(&columns, &type_hints)?;
        self.columns = build_columns(&columns, &type_hints);
        self.data = Arc::new(data);
        self.edits.reset();

        let cols = &self.columns;
        self.sort
            .retain(|s| cols.get(s.column).is_some_and(|c| c.sortable));
        self.filters.retain(|f| {
            cols.get(f.column)
                .is_some_and(|c| c.filterable && f.value.fits(c))
        });

        let row_count = self.data.len();
        let pruned = self.selection.prune(|k| k.get() < row_count);
        self.rebuild_rows();
        tracing::debug!(rows = row_count, "data updated in place");
        self.touch();
        if pruned {
            self.notify_selection();
        }
        Ok(())
    }

    fn rebuild_rows(&mut self) {
        self.row_model = if self.sort.is_empty() && self.filters.is_empty() {
            RowModel::identity(self.data.len())
        } else {
            RowModel::build(&self.columns, &self.data, &self.sort, &self.filters)
        };
        self.virtualizer.set_items(self.row_model.keys().to_vec());
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    // ---- queries ----

    /// State version, incremented after every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether anything changed since `version`.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.version > version
    }

    /// Dataset generation (incremented by every swap).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Column metadata.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// A snapshot of the row buffer.
    pub fn data(&self) -> Arc<Vec<Vec<CellValue>>> {
        Arc::clone(&self.data)
    }

    /// Rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Authoritative value of a cell.
    pub fn cell_value(&self, row: usize, column: usize) -> Option<&CellValue> {
        let column = self.columns.get(column)?;
        self.data.get(row).map(|values| column.value(values))
    }

    /// Edit record of a cell, if it was touched.
    pub fn edit_record(&self, key: EditKey) -> Option<&CellEditRecord> {
        self.edits.get(&key)
    }

    /// Edit state of a cell.
    pub fn cell_state(&self, key: EditKey) -> CellState {
        self.edits.state(&key)
    }

    /// The cell being edited.
    pub fn editing(&self) -> Option<EditKey> {
        self.edits.editing()
    }

    /// Display options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Selection modes.
    pub fn selection_modes(&self) -> SelectionModes {
        self.modes
    }

    /// The selection controller.
    pub fn selection(&self) -> &SelectionController<RowKey> {
        &self.selection
    }

    /// The row model (view order).
    pub fn row_model(&self) -> &RowModel {
        &self.row_model
    }

    /// The virtualizer.
    pub fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    /// Current sort.
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Current filters.
    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    /// Dataset row indexes in view order.
    pub fn data_view_rows(&self) -> Vec<usize> {
        self.row_model.data_view_rows()
    }

    /// Selected dataset row indexes that are in the current view, ascending.
    pub fn selected_rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .selection
            .selected()
            .iter()
            .filter(|k| self.row_model.contains(**k))
            .map(|k| k.get())
            .collect();
        rows.sort_unstable();
        rows
    }

    /// Number of patch requests awaiting a reply.
    pub fn pending_patches(&self) -> usize {
        self.patches.in_flight_count()
    }

    // ---- selection ----

    /// Subscribe to selection changes.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SelectionChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify_selection(&mut self) {
        let change = SelectionChange {
            rows: self.selected_rows(),
            version: self.version,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }

    /// Apply a pointer or keyboard selection intent.
    ///
    /// A pointer press on a row other than the one being edited commits the edit first (blur).
    /// Enter on a row of an editable grid starts editing its first cell.
    pub fn dispatch_selection(&mut self, intent: SelectionIntent<RowKey>) -> SelectionOutcome<RowKey> {
        if let SelectionIntent::PointerDown { key, .. } = &intent
            && let Some(editing) = self.edits.editing()
            && editing.row_index != key.get()
            && let Err(err) = self.dispatch_edit(EditIntent::Commit(CommitTrigger::Blur))
        {
            tracing::warn!(error = %err, "blur commit failed");
        }

        let ctx = SelectionContext {
            editing_row: self.edits.editing().map(|k| RowKey(k.row_index)),
            edit_cells_allowed: self.options.editable,
        };
        let outcome = self.selection.handle(intent, &ctx, &self.row_model);
        if !outcome.handled {
            return outcome;
        }

        if let Some(focus) = outcome.focus
            && let Some(position) = self.row_model.position(focus)
        {
            self.virtualizer.scroll_to_index(position, ScrollAlign::Auto);
        }
        if let Some(row) = outcome.edit_row
            && !self.columns.is_empty()
            && let Err(err) = self.dispatch_edit(EditIntent::Activate(EditKey::new(row.get(), 0)))
        {
            tracing::debug!(error = %err, "enter did not start editing");
        }

        self.touch();
        if outcome.selection_changed {
            self.notify_selection();
        }
        outcome
    }

    /// Host override of the selection (dataset row indexes).
    ///
    /// Unknown rows are ignored; in single mode only the first row is kept. Returns whether the
    /// selection changed.
    pub fn set_selected_rows(&mut self, rows: &[usize]) -> bool {
        if self.selection.mode() == RowSelectionMode::None {
            tracing::warn!("ignoring selection update: row selection is disabled");
            return false;
        }
        let row_count = self.data.len();
        let mut keys: Vec<RowKey> = rows
            .iter()
            .filter(|&&r| r < row_count)
            .map(|&r| RowKey(r))
            .collect();
        if self.selection.mode() == RowSelectionMode::Single && keys.len() > 1 {
            tracing::warn!(count = keys.len(), "single selection mode: keeping the first row");
            keys.truncate(1);
        }
        let changed = self.selection.set_selection(keys);
        if changed {
            self.touch();
            self.notify_selection();
        }
        changed
    }

    /// Move keyboard focus without touching the selection, scrolling the row into view.
    ///
    /// Rows outside the current view clear the focus.
    pub fn set_focused_row(&mut self, row: Option<RowKey>) {
        let position = row.and_then(|key| self.row_model.position(key));
        self.selection.set_focused(row.filter(|_| position.is_some()));
        if let Some(position) = position {
            self.virtualizer.scroll_to_index(position, ScrollAlign::Auto);
        }
        self.touch();
    }

    // ---- sort & filter ----

    /// Cycle the sort of `column` (see [`SortState::toggle`]).
    pub fn toggle_sort(&mut self, column: usize, multi: bool) -> Result<bool, GridError> {
        let col = self
            .columns
            .get(column)
            .ok_or(GridError::UnknownColumn(column))?;
        if !self.sort.toggle(col, multi) {
            return Ok(false);
        }
        self.after_view_change();
        Ok(true)
    }

    /// Host override of the sort.
    pub fn set_sort(&mut self, specs: Vec<SortSpec>) -> Result<(), GridError> {
        if let Some(spec) = specs.iter().find(|s| s.column >= self.columns.len()) {
            return Err(GridError::UnknownColumn(spec.column));
        }
        self.sort = SortState::from_specs(specs);
        self.after_view_change();
        Ok(())
    }

    /// Host override of the filters.
    pub fn set_filters(&mut self, filters: Vec<ColumnFilter>) -> Result<(), GridError> {
        validate_filters(&self.columns, &filters)?;
        self.filters = filters;
        self.after_view_change();
        Ok(())
    }

    fn after_view_change(&mut self) {
        let before = self.selected_rows();
        self.rebuild_rows();
        self.touch();
        if self.selected_rows() != before {
            self.notify_selection();
        }
    }

    // ---- editing ----

    fn check_cell(&self, key: EditKey) -> Result<(), EditError> {
        if key.row_index < self.data.len() && key.column_index < self.columns.len() {
            Ok(())
        } else {
            Err(EditError::OutOfBounds(key))
        }
    }

    fn authoritative_text(&self, key: EditKey) -> String {
        self.cell_value(key.row_index, key.column_index)
            .map(cell_text)
            .unwrap_or_default()
    }

    /// Apply an edit intent. Returns the cell being edited afterwards.
    pub fn dispatch_edit(&mut self, intent: EditIntent) -> Result<Option<EditKey>, EditError> {
        match intent {
            EditIntent::Activate(key) => self.activate(key)?,
            EditIntent::Input(text) => self.edits.set_value(text)?,
            EditIntent::Commit(trigger) => self.commit(trigger)?,
            EditIntent::Cancel => {
                let key = self.edits.cancel()?;
                tracing::debug!(%key, "cell edit cancelled");
            }
        }
        self.touch();
        Ok(self.edits.editing())
    }

    fn activate(&mut self, key: EditKey) -> Result<(), EditError> {
        if !self.options.editable {
            return Err(EditError::NotEditable);
        }
        self.check_cell(key)?;
        let text = self.authoritative_text(key);
        self.edits.activate(key, &text)?;
        if let Some(position) = self.row_model.position(RowKey(key.row_index)) {
            self.virtualizer.scroll_to_index(position, ScrollAlign::Auto);
        }
        Ok(())
    }

    fn commit(&mut self, trigger: CommitTrigger) -> Result<(), EditError> {
        let key = self.edits.editing().ok_or(EditError::NotEditing)?;
        let text = self.authoritative_text(key);
        if let CommitOutcome::Submit { key, value } = self.edits.commit(&text)? {
            self.patches.submit(key, CellValue::String(value));
        }

        let target = match trigger {
            CommitTrigger::Escape | CommitTrigger::Blur => None,
            CommitTrigger::Tab { reverse } => {
                let column = if reverse {
                    key.column_index.checked_sub(1)
                } else {
                    Some(key.column_index + 1).filter(|c| *c < self.columns.len())
                };
                column.map(|c| EditKey::new(key.row_index, c))
            }
            CommitTrigger::Enter { reverse } => self
                .enter_target(key.row_index, reverse)
                .map(|r| EditKey::new(r, key.column_index)),
        };

        if let Some(target) = target
            && let Err(err) = self.activate(target)
        {
            tracing::debug!(%target, error = %err, "could not continue editing");
        }
        Ok(())
    }

    /// Row that Enter moves to from `row`.
    ///
    /// Movement follows view order. A sorted view stops at its edge. An unsorted view falls
    /// back to dataset order bounded by the row count, so the edit can land on a row that is
    /// filtered out.
    fn enter_target(&self, row: usize, reverse: bool) -> Option<usize> {
        let step = if reverse { -1 } else { 1 };
        let in_view = self
            .row_model
            .position(RowKey(row))
            .and_then(|p| p.checked_add_signed(step))
            .and_then(|p| self.row_model.key_at(p));
        if let Some(key) = in_view {
            return Some(key.get());
        }
        if !self.sort.is_empty() {
            return None;
        }
        let raw = row.checked_add_signed(step)?;
        if raw >= self.data.len() {
            return None;
        }
        if !self.row_model.contains(RowKey(raw)) {
            tracing::warn!(row = raw, "enter navigated into a row outside the current view");
        }
        Some(raw)
    }

    /// Propose a value for a cell without going through the editor.
    ///
    /// Returns `Ok(false)` when the value equals the authoritative text. A proposal for a cell
    /// that is still saving is queued behind the in-flight request.
    pub fn propose_edit(&mut self, key: EditKey, value: impl Into<String>) -> Result<bool, EditError> {
        if !self.options.editable {
            return Err(EditError::NotEditable);
        }
        self.check_cell(key)?;
        if self.edits.editing() == Some(key) {
            return Err(EditError::AlreadyEditing(key));
        }
        let value = value.into();
        if value == self.authoritative_text(key) {
            return Ok(false);
        }
        self.edits.mark_saving(key, &value);
        self.patches.submit(key, CellValue::String(value));
        self.touch();
        Ok(true)
    }

    // ---- patches ----

    /// Drain the patch requests issued since the last call.
    pub fn take_patch_requests(&mut self) -> Vec<PatchRequest> {
        self.patches.take_requests()
    }

    /// Apply one authority reply. Returns the cell it resolved, or `None` for stale replies.
    pub fn resolve_patch(&mut self, reply: PatchReply) -> Option<EditKey> {
        let resolution = self.patches.resolve(reply)?;
        let key = resolution.key;
        self.apply_resolution(resolution);
        Some(key)
    }

    /// Send pending requests to `authority` and apply every reply it has ready.
    ///
    /// Returns how many cells were resolved.
    pub fn drive(&mut self, authority: &mut dyn PatchAuthority) -> usize {
        let mut resolved = 0;
        for request in self.patches.take_requests() {
            let ticket = request.ticket;
            if let Err(err) = authority.send(request)
                && let Some(resolution) = self.patches.fail(ticket, err)
            {
                self.apply_resolution(resolution);
                resolved += 1;
            }
        }
        for reply in authority.poll() {
            if self.resolve_patch(reply).is_some() {
                resolved += 1;
            }
        }
        resolved
    }

    fn apply_resolution(&mut self, resolution: PatchResolution) {
        let PatchResolution {
            key,
            result,
            resubmitted,
        } = resolution;

        match result {
            Ok(patches) => {
                let touched_origin = patches.iter().any(|p| p.key() == key);
                self.write_patches(&patches);
                if !touched_origin {
                    let value = self
                        .cell_value(key.row_index, key.column_index)
                        .cloned()
                        .unwrap_or_default();
                    self.edits.resolve_success(key, &value);
                }
                tracing::debug!(%key, accepted = patches.len(), "patch accepted");
            }
            Err(err) if resubmitted.is_some() => {
                tracing::debug!(%key, error = %err, "patch failed, newer value already sent");
            }
            Err(err) => self.edits.resolve_failure(key, &err),
        }

        if let Some(value) = resubmitted {
            self.edits.mark_saving(key, &cell_text(&value));
        }
        self.rebuild_rows();
        self.touch();
    }

    fn write_patches(&mut self, patches: &[Patch]) {
        let column_count = self.columns.len();
        let data = Arc::make_mut(&mut self.data);
        let mut written = Vec::with_capacity(patches.len());
        for patch in patches {
            if patch.column_index >= column_count {
                tracing::warn!(key = %patch.key(), "patch for an unknown column ignored");
                continue;
            }
            let Some(row) = data.get_mut(patch.row_index) else {
                tracing::warn!(key = %patch.key(), "patch for an unknown row ignored");
                continue;
            };
            if row.len() <= patch.column_index {
                row.resize(patch.column_index + 1, CellValue::Null);
            }
            row[patch.column_index] = patch.value.clone();
            written.push(patch);
        }
        for patch in written {
            self.edits.resolve_success(patch.key(), &patch.value);
        }
    }

    /// Apply patches pushed by the authority on its own.
    ///
    /// The whole batch is rejected when any patch is out of bounds.
    pub fn apply_external_patches(&mut self, patches: Vec<Patch>) -> Result<(), GridError> {
        for patch in &patches {
            if patch.row_index >= self.data.len() {
                return Err(GridError::RowOutOfRange {
                    row: patch.row_index,
                    row_count: self.data.len(),
                });
            }
            if patch.column_index >= self.columns.len() {
                return Err(GridError::UnknownColumn(patch.column_index));
            }
        }
        self.write_patches(&patches);
        self.rebuild_rows();
        self.touch();
        Ok(())
    }

    // ---- viewport ----

    /// Set the viewport height.
    pub fn set_viewport(&mut self, height: f64) {
        self.virtualizer.set_viewport(height);
        self.touch();
    }

    /// Scroll to `offset`; see [`Virtualizer::scroll_to_offset`].
    pub fn scroll_to_offset(&mut self, offset: f64) -> bool {
        let changed = self.virtualizer.scroll_to_offset(offset);
        if changed {
            self.touch();
        }
        changed
    }

    /// Bring the row at view position `position` into view.
    pub fn scroll_to_index(&mut self, position: usize, align: ScrollAlign) -> bool {
        let changed = self.virtualizer.scroll_to_index(position, align);
        if changed {
            self.touch();
        }
        changed
    }

    /// Report a rendered row size; see [`Virtualizer::measure`].
    pub fn measure_row(&mut self, key: RowKey, size: f64, attached: bool) -> bool {
        let changed = self.virtualizer.measure(key, size, attached);
        if changed {
            self.touch();
        }
        changed
    }

    /// Retry queued measurements; see [`Virtualizer::layout_pass`].
    pub fn layout_pass<F>(&mut self, resolve: F) -> usize
    where
        F: FnMut(&RowKey) -> Option<f64>,
    {
        let measured = self.virtualizer.layout_pass(resolve);
        if measured > 0 {
            self.touch();
        }
        measured
    }

    // ---- rendering ----

    /// Snapshot of the virtual window.
    pub fn render_model(&self) -> RenderModel {
        let visible = self.virtualizer.visible_range();
        let focused = self.selection.focused().copied();
        let specs = self.sort.specs();

        let columns = self
            .columns
            .iter()
            .map(|c| RenderColumn {
                index: c.index,
                name: c.name.clone(),
                type_hint: c.type_hint.clone(),
                sort: specs
                    .iter()
                    .position(|s| s.column == c.index)
                    .map(|rank| (rank, specs[rank])),
                filtered: self.filters.iter().any(|f| f.column == c.index),
            })
            .collect();

        let rows = self
            .virtualizer
            .virtual_items()
            .into_iter()
            .filter_map(|item| {
                let values = self.data.get(item.key.get())?;
                let cells = self
                    .columns
                    .iter()
                    .map(|column| self.render_cell(item.key, column, values))
                    .collect();
                Some(RenderRow {
                    index: item.index,
                    key: item.key,
                    start: item.start,
                    size: item.size,
                    in_viewport: visible.as_ref().is_some_and(|r| r.contains(&item.index)),
                    selected: self.selection.is_selected(&item.key),
                    focused: focused == Some(item.key),
                    cells,
                })
            })
            .collect();

        RenderModel {
            version: self.version,
            columns,
            rows,
            summary: summary_text(&self.options.summary, visible.clone(), self.row_model.len()),
            visible,
            row_count: self.row_model.len(),
            dataset_row_count: self.data.len(),
            total_size: self.virtualizer.total_size(),
            scroll_offset: self.virtualizer.scroll_offset(),
        }
    }

    fn render_cell(&self, row: RowKey, column: &Column, values: &[CellValue]) -> RenderCell {
        let value = column.value(values).clone();
        let key = EditKey::new(row.get(), column.index);
        match self.edits.get(&key) {
            Some(record) => RenderCell {
                column_index: column.index,
                text: record.value.clone(),
                state: record.state,
                error_title: record.error_title.clone(),
                value,
            },
            None => RenderCell {
                column_index: column.index,
                text: cell_text(&value),
                state: CellState::Ready,
                error_title: None,
                value,
            },
        }
    }
}

impl std::fmt::Debug for GridController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("generation", &self.generation)
            .field("version", &self.version)
            .field("rows", &self.data.len())
            .field("columns", &self.columns.len())
            .field("editing", &self.edits.editing())
            .finish_non_exhaustive()
    }
}
