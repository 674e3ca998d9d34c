//! Host-supplied grid configuration.
//!
//! The host hands the grid one JSON document:
//!
//! ```json
//! {
//!   "payload": {
//!     "columns": ["name", "age"],
//!     "typeHints": [{"type": "string"}, {"type": "numeric"}],
//!     "data": [["alice", 25], ["bob", 31]],
//!     "options": {"editable": true, "summary": "{start}-{end} of {total}"}
//!   },
//!   "patchInfo": {"key": "edit_handler"},
//!   "selectionModes": {"row": "single"}
//! }
//! ```

use crate::error::GridError;
use crate::model::{CellValue, Column, SelectionModes, TypeHint};
use crate::summary::SummaryOption;
use crate::virtualizer::{DEFAULT_ESTIMATE_SIZE, DEFAULT_OVERSCAN, VirtualizerOptions};
use serde::{Deserialize, Serialize};

fn default_overscan() -> usize {
    DEFAULT_OVERSCAN
}

fn default_estimate_row_size() -> f64 {
    DEFAULT_ESTIMATE_SIZE
}

/// Display and behavior switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    /// Cells may be edited (requires `patchInfo`).
    #[serde(default)]
    pub editable: bool,
    /// Column filters are offered.
    #[serde(default)]
    pub filters: bool,
    /// Footer summary.
    #[serde(default)]
    pub summary: SummaryOption,
    /// Rows rendered beyond each viewport edge.
    #[serde(default = "default_overscan")]
    pub overscan: usize,
    /// Row size assumed before measurement.
    #[serde(default = "default_estimate_row_size")]
    pub estimate_row_size: f64,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            editable: false,
            filters: false,
            summary: SummaryOption::default(),
            overscan: DEFAULT_OVERSCAN,
            estimate_row_size: DEFAULT_ESTIMATE_SIZE,
        }
    }
}

impl GridOptions {
    /// Virtualizer tuning derived from these options.
    ///
    /// The scroll epsilon stays below half a row so a one-row scroll is never swallowed.
    pub fn virtualizer_options(&self) -> VirtualizerOptions {
        let defaults = VirtualizerOptions::default();
        VirtualizerOptions {
            estimate_size: self.estimate_row_size,
            overscan: self.overscan,
            scroll_epsilon: defaults.scroll_epsilon.min(self.estimate_row_size / 2.0),
            ..defaults
        }
    }
}

/// Column names, hints and rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridPayload {
    /// Column headers.
    pub columns: Vec<String>,
    /// One hint per column (may be omitted entirely).
    #[serde(default)]
    pub type_hints: Vec<TypeHint>,
    /// Row tuples.
    #[serde(default)]
    pub data: Vec<Vec<CellValue>>,
    /// Switches.
    #[serde(default)]
    pub options: GridOptions,
}

/// Where edits are sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInfo {
    /// Edit-handler id, used as the wire `method`.
    pub key: String,
}

/// Complete grid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridInfo {
    /// Data and options.
    pub payload: GridPayload,
    /// Edit handler, required for editable grids.
    #[serde(default)]
    pub patch_info: Option<PatchInfo>,
    /// Selection modes (rows: multiple when absent).
    #[serde(default)]
    pub selection_modes: SelectionModes,
}

impl GridInfo {
    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, GridError> {
        let info: GridInfo = serde_json::from_str(json)?;
        info.validate()?;
        Ok(info)
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<(), GridError> {
        validate_type_hints(&self.payload.columns, &self.payload.type_hints)?;
        if self.payload.options.editable && self.patch_info.is_none() {
            return Err(GridError::InvalidPayload(
                "editable grids need patchInfo.key".to_string(),
            ));
        }
        let estimate = self.payload.options.estimate_row_size;
        if estimate.is_nan() || estimate <= 0.0 {
            return Err(GridError::InvalidPayload(format!(
                "estimateRowSize must be positive, got {estimate}"
            )));
        }
        Ok(())
    }

    /// Column metadata for the payload.
    pub fn columns(&self) -> Vec<Column> {
        build_columns(&self.payload.columns, &self.payload.type_hints)
    }
}

pub(crate) fn validate_type_hints(names: &[String], hints: &[TypeHint]) -> Result<(), GridError> {
    if !hints.is_empty() && hints.len() != names.len() {
        return Err(GridError::InvalidPayload(format!(
            "{} type hints for {} columns",
            hints.len(),
            names.len()
        )));
    }
    Ok(())
}

/// Pair column names with their hints (missing hints become `Unknown`).
pub fn build_columns(names: &[String], hints: &[TypeHint]) -> Vec<Column> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let hint = hints.get(index).cloned().unwrap_or_default();
            Column::new(index, name.clone(), hint)
        })
        .collect()
}
