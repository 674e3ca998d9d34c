//! Error types shared by the grid engine.

use crate::model::EditKey;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while binding a dataset or applying host-driven updates.
pub enum GridError {
    #[error("config parse error: {0}")]
    /// The host payload could not be deserialized.
    Config(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    /// The payload deserialized but is structurally inconsistent.
    InvalidPayload(String),

    #[error("unknown column index {0}")]
    /// A column index outside the current column list.
    UnknownColumn(usize),

    #[error("row index {row} out of range (row count {row_count})")]
    /// A row index outside the current dataset.
    RowOutOfRange {
        /// Requested row index.
        row: usize,
        /// Row count of the bound dataset.
        row_count: usize,
    },

    #[error("column {0} is not filterable")]
    /// A filter was requested for a column that does not allow filtering.
    NotFilterable(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the cell edit state machine.
pub enum EditError {
    #[error("cell editing is not enabled for this grid")]
    /// The grid was configured without `editable`.
    NotEditable,

    #[error("cell {0} is already being edited")]
    /// Another cell holds the single editing slot.
    AlreadyEditing(EditKey),

    #[error("cell {0} is waiting for the authority")]
    /// The cell is in `EditSaving` and therefore read-only.
    Saving(EditKey),

    #[error("no cell is being edited")]
    /// An edit-buffer operation arrived without an active edit.
    NotEditing,

    #[error("cell {0} is outside the dataset")]
    /// Row or column index outside the bound dataset.
    OutOfBounds(EditKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failures of a single patch round trip.
///
/// Every variant is local to the cell that issued the patch; the stringified form is what the
/// grid shows as the cell's error title.
pub enum PatchError {
    #[error("{0}")]
    /// The authority rejected the patch (or threw); the message is shown verbatim.
    Rejected(String),

    #[error("malformed patch response: {0}")]
    /// The authority replied with something that is not a list of patches.
    MalformedResponse(String),

    #[error("transport error: {0}")]
    /// The request never reached the authority, or the reply never came back.
    Transport(String),

    #[error("stale patch reply")]
    /// The reply belongs to a replaced dataset or a superseded request.
    Stale,
}
