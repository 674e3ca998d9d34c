#![warn(missing_docs)]
//! Grid Core - Headless Virtualized Data-Grid Engine
//!
//! # Overview
//!
//! `grid-core` is the state-transition engine of an interactive data grid. It renders nothing and
//! captures no input: hosts feed it intents and read back an immutable render model for the rows
//! inside the virtual window.
//!
//! # Core Features
//!
//! - **Row Selection**: single/multiple modes, Shift ranges in visual order, platform-aware Ctrl/Meta
//! - **Cell Editing**: per-cell state machine with a single editing slot and failure-preserving buffers
//! - **Patch Protocol**: asynchronous commits to a remote authority, per-cell request queue
//! - **Virtualization**: cumulative offsets, measured/estimated sizes, overscan, deferred measurement
//! - **Sort & Filter**: stable multi-column sort, text and numeric range filters
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  GridController (intents, lifecycle)        │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Render Model (RenderModel)                 │  ← Rendering Data
//! ├──────────────────────┬──────────────────────┤
//! │  SelectionController │  CellEditStore       │  ← Interaction State
//! │  ImmutableSelection  │  PatchProtocol       │
//! ├──────────────────────┴──────────────────────┤
//! │  RowModel (sort + filter) · Virtualizer     │  ← View Order & Window
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use grid_core::{GridController, Modifiers, RowKey, SelectionIntent};
//! use std::sync::{Arc, Mutex};
//!
//! let mut grid = GridController::from_json(r#"{
//!     "payload": {"columns": ["n"], "data": [[1], [2], [3], [4]]}
//! }"#).unwrap();
//!
//! let published = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&published);
//! grid.subscribe(move |change| *sink.lock().unwrap() = change.rows.clone());
//!
//! grid.dispatch_selection(SelectionIntent::PointerDown { key: RowKey(1), modifiers: Modifiers::NONE });
//! grid.dispatch_selection(SelectionIntent::PointerDown { key: RowKey(3), modifiers: Modifiers::SHIFT });
//!
//! assert_eq!(*published.lock().unwrap(), vec![1, 2, 3]);
//! ```
//!
//! # Module Description
//!
//! - [`selection_set`] - Persistent set of row keys
//! - [`selection`] - Pointer/keyboard selection semantics
//! - [`cell_edit`] - Cell edit state machine
//! - [`patch`] - Patch requests, replies and the authority seam
//! - [`row_model`] - Sorting and filtering
//! - [`virtualizer`] - Visible window computation
//! - [`snapshot`] - Render model
//! - [`summary`] - Viewing-rows summary text
//! - [`grid`] - The grid controller
//! - [`config`] - Host configuration

pub mod cell_edit;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod patch;
pub mod row_model;
pub mod selection;
pub mod selection_set;
pub mod snapshot;
pub mod summary;
pub mod virtualizer;

pub use cell_edit::{CellEditRecord, CellEditStore, CellState, CommitOutcome};
pub use config::{GridInfo, GridOptions, GridPayload, PatchInfo, build_columns};
pub use error::{EditError, GridError, PatchError};
pub use grid::{
    CommitTrigger, EditIntent, GridController, SelectionChange, SelectionChangeCallback,
};
pub use model::{
    CellValue, ColSelectionMode, Column, EditKey, RectSelectionMode, RowKey,
    RowSelectionMode, SelectionModes, TypeHint, cell_number, cell_text,
};
pub use patch::{
    Patch, PatchAuthority, PatchProtocol, PatchReply, PatchRequest, PatchResolution, PatchTicket,
    SubmitOutcome, parse_patch_response, rejection_message,
};
pub use row_model::{ColumnFilter, FilterValue, RowModel, SortSpec, SortState};
pub use selection::{
    Modifiers, NavKey, Platform, RowOrder, SelectionContext, SelectionController,
    SelectionIntent, SelectionOutcome, resolve_pointer_down,
};
pub use selection_set::ImmutableSelectionSet;
pub use snapshot::{RenderCell, RenderColumn, RenderModel, RenderRow};
pub use summary::{DEFAULT_SUMMARY_TEMPLATE, SummaryOption, format_summary, summary_text};
pub use virtualizer::{ScrollAlign, VirtualItem, Virtualizer, VirtualizerOptions};
