//! Per-cell edit state machine and value buffer.
//!
//! # Overview
//!
//! A cell without a record shows its authoritative value in the `Ready` state. The first time a
//! cell is touched it gets a [`CellEditRecord`], which then persists until the dataset is reset
//! or a later edit supersedes it.
//!
//! ```text
//!            activate                commit (changed)
//!   Ready ─────────────▶ Editing ─────────────────────▶ EditSaving
//!     ▲                     │                              │   │
//!     └─── commit (same) ───┘               authority ok   │   │ authority error
//!                                                ▼         │   ▼
//!                              EditSuccess ◀───────────────┘  EditFailure
//!                                  │ activate                    │ activate
//!                                  └──────────▶ Editing ◀────────┘
//! ```
//!
//! At most one cell is `Editing` at any time. A failed cell keeps the text the user typed, so
//! re-activating it resumes from that text rather than the stale authoritative value.

use crate::error::{EditError, PatchError};
use crate::model::{CellValue, EditKey, cell_text};
use std::collections::HashMap;
use std::sync::Arc;

/// Lifecycle state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    /// Showing the authoritative value.
    #[default]
    Ready,
    /// The user is typing into the cell.
    Editing,
    /// A patch is in flight; the cell is read-only.
    EditSaving,
    /// The authority accepted the last patch.
    EditSuccess,
    /// The authority rejected the last patch.
    EditFailure,
}

impl CellState {
    /// Style hook for renderers (`None` for the plain state).
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            CellState::Ready => None,
            CellState::Editing => Some("cell-edit-editing"),
            CellState::EditSaving => Some("cell-edit-saving"),
            CellState::EditSuccess => Some("cell-edit-success"),
            CellState::EditFailure => Some("cell-edit-failure"),
        }
    }

    /// Whether a cell in this state may enter `Editing`.
    pub fn can_activate(self) -> bool {
        !matches!(self, CellState::EditSaving)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BeforeEdit {
    existed: bool,
    value: String,
    state: CellState,
    error_title: Option<String>,
}

/// Edit overlay of a touched cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEditRecord {
    /// Text shown in the cell: the edit buffer while editing or saving, the user's last text
    /// after a failure, the authoritative text after a success.
    pub value: String,
    /// Lifecycle state.
    pub state: CellState,
    /// Error message of the last failed patch (tooltip text).
    pub error_title: Option<String>,
    before_edit: Option<BeforeEdit>,
}

impl CellEditRecord {
    fn new(value: String, state: CellState) -> Self {
        Self {
            value,
            state,
            error_title: None,
            before_edit: None,
        }
    }
}

/// Result of committing the editing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The text matched the authoritative value; the cell returned to `Ready`.
    Unchanged(EditKey),
    /// The cell moved to `EditSaving`; `value` must be sent to the authority.
    Submit {
        /// The committed cell.
        key: EditKey,
        /// The full proposed text.
        value: String,
    },
}

/// All edit records of one grid instance.
///
/// Records are held behind an `Arc` and updated copy-on-write, so [`snapshot`](Self::snapshot)
/// hands out a consistent view that later mutations never touch.
#[derive(Debug, Clone, Default)]
pub struct CellEditStore {
    records: Arc<HashMap<EditKey, CellEditRecord>>,
    editing: Option<EditKey>,
}

impl CellEditStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `key`, if the cell was ever touched.
    pub fn get(&self, key: &EditKey) -> Option<&CellEditRecord> {
        self.records.get(key)
    }

    /// State of `key` (`Ready` when untouched).
    pub fn state(&self, key: &EditKey) -> CellState {
        self.records.get(key).map(|r| r.state).unwrap_or_default()
    }

    /// The cell currently in `Editing`.
    pub fn editing(&self) -> Option<EditKey> {
        self.editing
    }

    /// Number of touched cells.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no cell was touched.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A shared, immutable view of every record.
    pub fn snapshot(&self) -> Arc<HashMap<EditKey, CellEditRecord>> {
        Arc::clone(&self.records)
    }

    /// Drop every record and the editing slot.
    pub fn reset(&mut self) {
        self.records = Arc::new(HashMap::new());
        self.editing = None;
    }

    fn records_mut(&mut self) -> &mut HashMap<EditKey, CellEditRecord> {
        Arc::make_mut(&mut self.records)
    }

    /// Put `key` into `Editing`.
    ///
    /// The buffer starts from `authoritative_text`, except after a failure where the user's last
    /// text is kept.
    pub fn activate(&mut self, key: EditKey, authoritative_text: &str) -> Result<(), EditError> {
        match self.editing {
            Some(current) if current == key => return Ok(()),
            Some(current) => return Err(EditError::AlreadyEditing(current)),
            None => {}
        }

        let existing = self.records.get(&key).cloned();
        if existing.as_ref().is_some_and(|r| !r.state.can_activate()) {
            return Err(EditError::Saving(key));
        }

        let before = match &existing {
            Some(r) => BeforeEdit {
                existed: true,
                value: r.value.clone(),
                state: r.state,
                error_title: r.error_title.clone(),
            },
            None => BeforeEdit {
                existed: false,
                value: authoritative_text.to_string(),
                state: CellState::Ready,
                error_title: None,
            },
        };

        let value = match &existing {
            Some(r) if r.state == CellState::EditFailure => r.value.clone(),
            _ => authoritative_text.to_string(),
        };

        let record = CellEditRecord {
            value,
            state: CellState::Editing,
            error_title: existing.and_then(|r| r.error_title),
            before_edit: Some(before),
        };
        self.records_mut().insert(key, record);
        self.editing = Some(key);
        tracing::debug!(%key, "cell edit activated");
        Ok(())
    }

    /// Replace the edit buffer of the editing cell.
    pub fn set_value(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        let key = self.editing.ok_or(EditError::NotEditing)?;
        let text = text.into();
        if let Some(record) = self.records_mut().get_mut(&key) {
            record.value = text;
        }
        Ok(())
    }

    /// The current edit buffer.
    pub fn editing_value(&self) -> Option<&str> {
        let key = self.editing?;
        self.records.get(&key).map(|r| r.value.as_str())
    }

    /// Leave `Editing`, comparing the buffer against `authoritative_text` as strings.
    pub fn commit(&mut self, authoritative_text: &str) -> Result<CommitOutcome, EditError> {
        let key = self.editing.take().ok_or(EditError::NotEditing)?;
        let Some(record) = self.records_mut().get_mut(&key) else {
            return Err(EditError::NotEditing);
        };

        record.error_title = None;
        record.before_edit = None;
        if record.value == authoritative_text {
            record.state = CellState::Ready;
            tracing::debug!(%key, "cell edit committed without change");
            return Ok(CommitOutcome::Unchanged(key));
        }

        record.state = CellState::EditSaving;
        let value = record.value.clone();
        tracing::debug!(%key, "cell edit committed, awaiting authority");
        Ok(CommitOutcome::Submit { key, value })
    }

    /// Leave `Editing` without committing, restoring the record as it was before activation.
    pub fn cancel(&mut self) -> Result<EditKey, EditError> {
        let key = self.editing.take().ok_or(EditError::NotEditing)?;
        let before = self
            .records
            .get(&key)
            .and_then(|r| r.before_edit.clone());

        match before {
            Some(before) if !before.existed => {
                self.records_mut().remove(&key);
            }
            Some(before) => {
                let restored = CellEditRecord {
                    value: before.value,
                    state: before.state,
                    error_title: before.error_title,
                    before_edit: None,
                };
                self.records_mut().insert(key, restored);
            }
            None => {}
        }
        Ok(key)
    }

    /// Put `key` into `EditSaving` with `value` (used when a queued commit is sent).
    pub fn mark_saving(&mut self, key: EditKey, value: &str) {
        if self.editing == Some(key) {
            return;
        }
        let record = self
            .records_mut()
            .entry(key)
            .or_insert_with(|| CellEditRecord::new(String::new(), CellState::Ready));
        record.value = value.to_string();
        record.state = CellState::EditSaving;
        record.error_title = None;
    }

    /// The authority accepted a patch for `key`; `value` is the authoritative result.
    ///
    /// A cell the user is currently typing into keeps its buffer.
    pub fn resolve_success(&mut self, key: EditKey, value: &CellValue) {
        if self.editing == Some(key) {
            return;
        }
        let text = cell_text(value);
        let record = self
            .records_mut()
            .entry(key)
            .or_insert_with(|| CellEditRecord::new(String::new(), CellState::Ready));
        record.value = text;
        record.state = CellState::EditSuccess;
        record.error_title = None;
    }

    /// The authority rejected the patch for `key`. The user's text is left in place.
    pub fn resolve_failure(&mut self, key: EditKey, error: &PatchError) {
        if self.editing == Some(key) {
            return;
        }
        let record = self
            .records_mut()
            .entry(key)
            .or_insert_with(|| CellEditRecord::new(String::new(), CellState::Ready));
        record.state = CellState::EditFailure;
        record.error_title = Some(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(r: usize, c: usize) -> EditKey {
        EditKey::new(r, c)
    }

    #[test]
    fn test_untouched_cell_is_ready() {
        let store = CellEditStore::new();
        assert_eq!(store.state(&key(0, 0)), CellState::Ready);
        assert!(store.get(&key(0, 0)).is_none());
    }

    #[test]
    fn test_single_editing_slot() {
        let mut store = CellEditStore::new();
        store.activate(key(0, 0), "a").unwrap();
        assert_eq!(
            store.activate(key(0, 1), "b"),
            Err(EditError::AlreadyEditing(key(0, 0)))
        );
        // Re-activating the same cell is a no-op.
        store.activate(key(0, 0), "a").unwrap();
    }

    #[test]
    fn test_unchanged_commit_returns_to_ready() {
        let mut store = CellEditStore::new();
        store.activate(key(1, 2), "5").unwrap();
        store.set_value("6").unwrap();
        store.set_value("5").unwrap();
        assert_eq!(store.commit("5"), Ok(CommitOutcome::Unchanged(key(1, 2))));
        assert_eq!(store.state(&key(1, 2)), CellState::Ready);
        assert_eq!(store.editing(), None);
    }

    #[test]
    fn test_changed_commit_enters_saving_and_blocks_activation() {
        let mut store = CellEditStore::new();
        store.activate(key(1, 2), "5").unwrap();
        store.set_value("7").unwrap();
        assert_eq!(
            store.commit("5"),
            Ok(CommitOutcome::Submit {
                key: key(1, 2),
                value: "7".to_string()
            })
        );
        assert_eq!(store.state(&key(1, 2)), CellState::EditSaving);
        assert_eq!(
            store.activate(key(1, 2), "5"),
            Err(EditError::Saving(key(1, 2)))
        );
    }

    #[test]
    fn test_failure_keeps_typed_value_and_reactivation_resumes_it() {
        let mut store = CellEditStore::new();
        store.activate(key(1, 2), "5").unwrap();
        store.set_value("7").unwrap();
        store.commit("5").unwrap();
        store.resolve_failure(key(1, 2), &PatchError::Rejected("out of range".into()));

        let record = store.get(&key(1, 2)).unwrap();
        assert_eq!(record.state, CellState::EditFailure);
        assert_eq!(record.value, "7");
        assert_eq!(record.error_title.as_deref(), Some("out of range"));

        store.activate(key(1, 2), "5").unwrap();
        assert_eq!(store.editing_value(), Some("7"));
    }

    #[test]
    fn test_success_takes_authoritative_text() {
        let mut store = CellEditStore::new();
        store.activate(key(0, 0), "5").unwrap();
        store.set_value("7.0").unwrap();
        store.commit("5").unwrap();
        store.resolve_success(key(0, 0), &json!(7));

        let record = store.get(&key(0, 0)).unwrap();
        assert_eq!(record.state, CellState::EditSuccess);
        assert_eq!(record.value, "7");
        assert_eq!(record.error_title, None);
    }

    #[test]
    fn test_cancel_restores_prior_record() {
        let mut store = CellEditStore::new();
        store.activate(key(0, 0), "a").unwrap();
        store.set_value("zzz").unwrap();
        assert_eq!(store.cancel(), Ok(key(0, 0)));
        assert!(store.get(&key(0, 0)).is_none());

        store.activate(key(0, 0), "a").unwrap();
        store.set_value("b").unwrap();
        store.commit("a").unwrap();
        store.resolve_failure(key(0, 0), &PatchError::Rejected("nope".into()));
        store.activate(key(0, 0), "a").unwrap();
        store.set_value("c").unwrap();
        store.cancel().unwrap();

        let record = store.get(&key(0, 0)).unwrap();
        assert_eq!(record.state, CellState::EditFailure);
        assert_eq!(record.value, "b");
        assert_eq!(record.error_title.as_deref(), Some("nope"));
    }

    #[test]
    fn test_snapshot_is_not_affected_by_later_writes() {
        let mut store = CellEditStore::new();
        store.activate(key(0, 0), "a").unwrap();
        let snapshot = store.snapshot();
        store.set_value("b").unwrap();
        assert_eq!(snapshot.get(&key(0, 0)).unwrap().value, "a");
        assert_eq!(store.editing_value(), Some("b"));
    }

    #[test]
    fn test_commit_without_edit_fails() {
        let mut store = CellEditStore::new();
        assert_eq!(store.commit(""), Err(EditError::NotEditing));
        assert_eq!(store.cancel(), Err(EditError::NotEditing));
    }
}
