//! Cell edit round trips through a mock authority.

use grid_core::{
    CellState, CommitTrigger, EditIntent, EditKey, GridController, GridInfo, PatchAuthority,
    PatchError, PatchReply, PatchRequest, Platform,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn grid() -> GridController {
    let info = GridInfo::from_json(
        r#"{
            "payload": {
                "columns": ["name", "qty", "price"],
                "typeHints": [{"type": "string"}, {"type": "numeric"}, {"type": "numeric"}],
                "data": [["a", 1, 3], ["b", 2, 5], ["c", 3, 8]],
                "options": {"editable": true}
            },
            "patchInfo": {"key": "edit_handler"},
            "selectionModes": {"row": "none"}
        }"#,
    )
    .unwrap();
    let mut grid = GridController::with_platform(info, Platform::Other).unwrap();
    grid.set_viewport(300.0);
    grid
}

/// Authority that answers every request with a fixed handler.
struct MockAuthority<F> {
    handler: F,
    replies: Vec<PatchReply>,
    seen: Vec<PatchRequest>,
}

impl<F> MockAuthority<F>
where
    F: FnMut(&PatchRequest) -> Result<Value, Value>,
{
    fn new(handler: F) -> Self {
        Self {
            handler,
            replies: Vec::new(),
            seen: Vec::new(),
        }
    }
}

impl<F> PatchAuthority for MockAuthority<F>
where
    F: FnMut(&PatchRequest) -> Result<Value, Value>,
{
    fn send(&mut self, request: PatchRequest) -> Result<(), PatchError> {
        let reply = match (self.handler)(&request) {
            Ok(result) => PatchReply::accepted(request.ticket, result),
            Err(error) => PatchReply::rejected(request.ticket, &error),
        };
        self.replies.push(reply);
        self.seen.push(request);
        Ok(())
    }

    fn poll(&mut self) -> Vec<PatchReply> {
        std::mem::take(&mut self.replies)
    }
}

struct Unreachable;

impl PatchAuthority for Unreachable {
    fn send(&mut self, _request: PatchRequest) -> Result<(), PatchError> {
        Err(PatchError::Transport("authority not running".into()))
    }

    fn poll(&mut self) -> Vec<PatchReply> {
        Vec::new()
    }
}

fn edit(grid: &mut GridController, key: EditKey, text: &str, trigger: CommitTrigger) {
    grid.dispatch_edit(EditIntent::Activate(key)).unwrap();
    grid.dispatch_edit(EditIntent::Input(text.to_string())).unwrap();
    grid.dispatch_edit(EditIntent::Commit(trigger)).unwrap();
}

#[test]
fn test_unchanged_edit_issues_no_patch() {
    let mut grid = grid();
    let key = EditKey::new(1, 2);
    grid.dispatch_edit(EditIntent::Activate(key)).unwrap();
    grid.dispatch_edit(EditIntent::Input("6".into())).unwrap();
    grid.dispatch_edit(EditIntent::Input("5".into())).unwrap();
    grid.dispatch_edit(EditIntent::Commit(CommitTrigger::Escape)).unwrap();

    assert_eq!(grid.cell_state(key), CellState::Ready);
    assert!(grid.take_patch_requests().is_empty());
}

#[test]
fn test_accepted_edit_applies_authoritative_value() {
    let mut grid = grid();
    let key = EditKey::new(1, 2);
    let mut authority = MockAuthority::new(|_req: &PatchRequest| {
        Ok(json!([{"row_index": 1, "column_index": 2, "value": 7}]))
    });

    edit(&mut grid, key, "7", CommitTrigger::Enter { reverse: false });
    // Enter moved the editor down one row.
    assert_eq!(grid.editing(), Some(EditKey::new(2, 2)));
    assert_eq!(grid.cell_state(key), CellState::EditSaving);

    assert_eq!(grid.drive(&mut authority), 1);
    assert_eq!(authority.seen.len(), 1);
    assert_eq!(authority.seen[0].method, "edit_handler");
    assert_eq!(
        authority.seen[0].args(),
        json!([[{"row_index": 1, "column_index": 2, "value": "7"}]])
    );

    assert_eq!(grid.cell_value(1, 2), Some(&json!(7)));
    let record = grid.edit_record(key).unwrap();
    assert_eq!(record.state, CellState::EditSuccess);
    assert_eq!(record.value, "7");
    assert_eq!(record.error_title, None);
}

#[test]
fn test_rejected_edit_keeps_typed_value() {
    let mut grid = grid();
    let key = EditKey::new(1, 2);
    let mut authority = MockAuthority::new(|_req: &PatchRequest| Err(json!("out of range")));

    edit(&mut grid, key, "7", CommitTrigger::Enter { reverse: false });
    grid.drive(&mut authority);

    assert_eq!(grid.cell_value(1, 2), Some(&json!(5)));
    let record = grid.edit_record(key).unwrap();
    assert_eq!(record.state, CellState::EditFailure);
    assert_eq!(record.value, "7");
    assert_eq!(record.error_title.as_deref(), Some("out of range"));

    // Retrying resumes from the typed value.
    grid.dispatch_edit(EditIntent::Cancel).unwrap();
    grid.dispatch_edit(EditIntent::Activate(key)).unwrap();
    let model = grid.render_model();
    assert_eq!(model.cell(grid_core::RowKey(1), 2).unwrap().text, "7");
}

#[test]
fn test_authority_coercion_is_authoritative() {
    let mut grid = grid();
    let key = EditKey::new(0, 1);
    let mut authority = MockAuthority::new(|req: &PatchRequest| {
        let patch = &req.patches[0];
        let number: f64 = patch.value.as_str().unwrap_or("0").trim().parse().unwrap_or(0.0);
        Ok(json!([{
            "row_index": patch.row_index,
            "column_index": patch.column_index,
            "value": number.round() as i64
        }]))
    });

    edit(&mut grid, key, " 41.6 ", CommitTrigger::Blur);
    grid.drive(&mut authority);
    assert_eq!(grid.cell_value(0, 1), Some(&json!(42)));
    assert_eq!(grid.edit_record(key).unwrap().value, "42");
}

#[test]
fn test_failures_stay_local_to_their_cell() {
    let mut grid = grid();
    let mut authority = MockAuthority::new(|req: &PatchRequest| {
        let patch = &req.patches[0];
        if patch.row_index == 0 {
            Ok(json!({"not": "a patch list"}))
        } else {
            Ok(json!([{"row_index": patch.row_index, "column_index": patch.column_index, "value": patch.value}]))
        }
    });

    edit(&mut grid, EditKey::new(0, 0), "x", CommitTrigger::Escape);
    edit(&mut grid, EditKey::new(2, 0), "z", CommitTrigger::Escape);
    assert_eq!(grid.drive(&mut authority), 2);

    let bad = grid.edit_record(EditKey::new(0, 0)).unwrap();
    assert_eq!(bad.state, CellState::EditFailure);
    assert_eq!(bad.value, "x");
    assert!(
        bad.error_title
            .as_deref()
            .unwrap()
            .starts_with("malformed patch response")
    );
    assert_eq!(grid.cell_value(0, 0), Some(&json!("a")));

    assert_eq!(grid.cell_state(EditKey::new(2, 0)), CellState::EditSuccess);
    assert_eq!(grid.cell_value(2, 0), Some(&json!("z")));
}

#[test]
fn test_transport_failure_marks_cell_failed() {
    let mut grid = grid();
    let key = EditKey::new(0, 0);
    edit(&mut grid, key, "x", CommitTrigger::Tab { reverse: false });
    assert_eq!(grid.editing(), Some(EditKey::new(0, 1)));

    assert_eq!(grid.drive(&mut Unreachable), 1);
    let record = grid.edit_record(key).unwrap();
    assert_eq!(record.state, CellState::EditFailure);
    assert_eq!(
        record.error_title.as_deref(),
        Some("transport error: authority not running")
    );
}

#[test]
fn test_grid_stays_interactive_while_saving() {
    let mut grid = grid();
    let saving = EditKey::new(0, 0);
    edit(&mut grid, saving, "x", CommitTrigger::Escape);

    assert_eq!(
        grid.dispatch_edit(EditIntent::Activate(saving)),
        Err(grid_core::EditError::Saving(saving))
    );
    let other = EditKey::new(1, 0);
    assert_eq!(grid.dispatch_edit(EditIntent::Activate(other)), Ok(Some(other)));

    let model = grid.render_model();
    assert!(model.cell(grid_core::RowKey(0), 0).unwrap().is_read_only());
}

#[test]
fn test_reply_after_dataset_swap_is_dropped() {
    let mut grid = grid();
    edit(&mut grid, EditKey::new(1, 2), "7", CommitTrigger::Escape);
    let request = grid.take_patch_requests().remove(0);

    let info = GridInfo::from_json(
        r#"{
            "payload": {"columns": ["x", "y", "z"], "data": [[0, 0, 0], [0, 0, 0]], "options": {"editable": true}},
            "patchInfo": {"key": "edit_handler"}
        }"#,
    )
    .unwrap();
    grid.replace_dataset(info).unwrap();

    let resolved = grid.resolve_patch(PatchReply::accepted(
        request.ticket,
        json!([{"row_index": 1, "column_index": 2, "value": 7}]),
    ));
    assert_eq!(resolved, None);
    assert_eq!(grid.cell_value(1, 2), Some(&json!(0)));
    assert_eq!(grid.cell_state(EditKey::new(1, 2)), CellState::Ready);
}
