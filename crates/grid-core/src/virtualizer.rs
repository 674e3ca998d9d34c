//! Windowed row virtualization.
//!
//! # Overview
//!
//! The virtualizer keeps a cumulative offset for every row of the row model, using measured sizes
//! where a renderer reported one and the estimate everywhere else. From the scroll offset and the
//! viewport height it derives the contiguous range of rows that intersect the viewport, padded by
//! `overscan` rows on each side.
//!
//! Measurements that arrive before a row is attached to the host's surface are not trusted: they
//! are queued and retried on the next [`layout_pass`](Virtualizer::layout_pass).
//!
//! # Example
//!
//! ```rust
//! use grid_core::{RowKey, Virtualizer, VirtualizerOptions};
//!
//! let mut v = Virtualizer::new(VirtualizerOptions {
//!     estimate_size: 10.0,
//!     overscan: 1,
//!     ..VirtualizerOptions::default()
//! });
//! v.set_items((0..10).map(RowKey).collect());
//! v.set_viewport(30.0);
//! v.scroll_to_offset(30.0);
//!
//! assert_eq!(v.visible_range(), Some(3..6));
//! assert_eq!(v.range_with_overscan(), 2..7);
//! ```

use crate::model::RowKey;
use std::collections::HashMap;
use std::ops::Range;

/// Default row-size estimate.
pub const DEFAULT_ESTIMATE_SIZE: f64 = 31.0;
/// Default overscan.
pub const DEFAULT_OVERSCAN: usize = 15;

/// Virtualizer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualizerOptions {
    /// Size assumed for rows that were never measured.
    pub estimate_size: f64,
    /// Rows rendered beyond each edge of the viewport.
    pub overscan: usize,
    /// Space before the first row (sticky header).
    pub padding_start: f64,
    /// Scroll requests within this distance of the current offset are ignored.
    pub scroll_epsilon: f64,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            estimate_size: DEFAULT_ESTIMATE_SIZE,
            overscan: DEFAULT_OVERSCAN,
            padding_start: 0.0,
            scroll_epsilon: 1.0,
        }
    }
}

/// One row the host should render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    /// Position in the row model.
    pub index: usize,
    /// Offset of the row's leading edge.
    pub start: f64,
    /// Measured or estimated size.
    pub size: f64,
    /// Row identity.
    pub key: RowKey,
}

impl VirtualItem {
    /// Offset of the row's trailing edge.
    pub fn end(&self) -> f64 {
        self.start + self.size
    }
}

/// Where [`Virtualizer::scroll_to_index`] places the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollAlign {
    /// Leading edge of the row at the top of the viewport.
    Start,
    /// Row centred in the viewport.
    Center,
    /// Trailing edge of the row at the bottom of the viewport.
    End,
    /// Scroll the minimum distance that makes the row fully visible.
    #[default]
    Auto,
}

/// Visible-window calculator for one grid.
#[derive(Debug, Clone)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    keys: Vec<RowKey>,
    index_of: HashMap<RowKey, usize>,
    measured: HashMap<RowKey, f64>,
    pending: Vec<RowKey>,
    starts: Vec<f64>,
    total: f64,
    viewport: f64,
    scroll_offset: f64,
}

impl Virtualizer {
    /// Create an empty virtualizer.
    pub fn new(options: VirtualizerOptions) -> Self {
        Self {
            options,
            keys: Vec::new(),
            index_of: HashMap::new(),
            measured: HashMap::new(),
            pending: Vec::new(),
            starts: Vec::new(),
            total: options.padding_start,
            viewport: 0.0,
            scroll_offset: 0.0,
        }
    }

    /// Current options.
    pub fn options(&self) -> &VirtualizerOptions {
        &self.options
    }

    /// Bind the rows of the current row model (view order).
    ///
    /// Measurements are keyed by row identity and survive re-sorting.
    pub fn set_items(&mut self, keys: Vec<RowKey>) {
        self.index_of = keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        self.keys = keys;
        self.pending.retain(|k| self.index_of.contains_key(k));
        self.rebuild_from(0);
        self.clamp_scroll();
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Set the viewport height.
    pub fn set_viewport(&mut self, height: f64) {
        self.viewport = height.max(0.0);
        self.clamp_scroll();
    }

    /// Viewport height.
    pub fn viewport(&self) -> f64 {
        self.viewport
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Total scrollable size.
    pub fn total_size(&self) -> f64 {
        self.total
    }

    fn max_scroll(&self) -> f64 {
        (self.total - self.viewport).max(0.0)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, self.max_scroll());
    }

    fn size_at(&self, index: usize) -> f64 {
        self.keys
            .get(index)
            .and_then(|k| self.measured.get(k))
            .copied()
            .unwrap_or(self.options.estimate_size)
    }

    fn rebuild_from(&mut self, from: usize) {
        self.starts.truncate(from);
        let mut offset = match from.checked_sub(1) {
            Some(prev) => self.starts[prev] + self.size_at(prev),
            None => self.options.padding_start,
        };
        for index in from..self.keys.len() {
            self.starts.push(offset);
            offset += self.size_at(index);
        }
        self.total = offset;
    }

    /// Size of the row at `index` (measured or estimated).
    pub fn item_size(&self, index: usize) -> Option<f64> {
        (index < self.keys.len()).then(|| self.size_at(index))
    }

    /// Layout of the row at `index`.
    pub fn item(&self, index: usize) -> Option<VirtualItem> {
        let key = *self.keys.get(index)?;
        Some(VirtualItem {
            index,
            start: self.starts[index],
            size: self.size_at(index),
            key,
        })
    }

    /// Report the rendered size of `key`.
    ///
    /// When the row is not attached yet the measurement is queued for the next layout pass and
    /// `false` is returned. If a row above the viewport changes size, the scroll offset moves by
    /// the same amount so the visible rows stay put.
    pub fn measure(&mut self, key: RowKey, size: f64, attached: bool) -> bool {
        let Some(&index) = self.index_of.get(&key) else {
            return false;
        };
        if !attached {
            if !self.pending.contains(&key) {
                tracing::debug!(%key, "row measured before attach, retrying on next layout pass");
                self.pending.push(key);
            }
            return false;
        }

        let previous = self.size_at(index);
        self.pending.retain(|k| *k != key);
        if previous == size {
            self.measured.insert(key, size);
            return false;
        }

        self.measured.insert(key, size);
        let above_viewport = self.starts[index] < self.scroll_offset;
        self.rebuild_from(index);
        if above_viewport {
            self.scroll_offset += size - previous;
        }
        self.clamp_scroll();
        true
    }

    /// Rows whose measurement is waiting for attachment.
    pub fn pending_measurements(&self) -> &[RowKey] {
        &self.pending
    }

    /// Retry queued measurements. `resolve` returns the size of an attached row and `None` for a
    /// row that is still detached (which stays queued). Returns how many rows were measured.
    pub fn layout_pass<F>(&mut self, mut resolve: F) -> usize
    where
        F: FnMut(&RowKey) -> Option<f64>,
    {
        let pending = std::mem::take(&mut self.pending);
        let mut measured = 0;
        for key in pending {
            match resolve(&key) {
                Some(size) => {
                    self.measure(key, size, true);
                    measured += 1;
                }
                None => self.pending.push(key),
            }
        }
        measured
    }

    /// Rows intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> Option<Range<usize>> {
        if self.keys.is_empty() || self.viewport <= 0.0 {
            return None;
        }
        let offset = self.scroll_offset;
        let first = self.first_ending_after(offset);
        if first >= self.keys.len() {
            return None;
        }

        let end = offset + self.viewport;
        let mut last = first;
        while last + 1 < self.keys.len() && self.starts[last + 1] < end {
            last += 1;
        }
        Some(first..last + 1)
    }

    fn first_ending_after(&self, offset: f64) -> usize {
        let (mut lo, mut hi) = (0, self.keys.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.starts[mid] + self.size_at(mid) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// The visible range padded by `overscan` on each side (empty when nothing is visible).
    pub fn range_with_overscan(&self) -> Range<usize> {
        match self.visible_range() {
            Some(range) => {
                let start = range.start.saturating_sub(self.options.overscan);
                let end = (range.end + self.options.overscan).min(self.keys.len());
                start..end
            }
            None => 0..0,
        }
    }

    /// Layout of every row the host should render.
    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        self.range_with_overscan()
            .filter_map(|i| self.item(i))
            .collect()
    }

    /// Scroll to `offset` (clamped). Returns whether the offset changed; requests within the
    /// scroll epsilon of the current offset are no-ops.
    pub fn scroll_to_offset(&mut self, offset: f64) -> bool {
        let target = offset.clamp(0.0, self.max_scroll());
        if (target - self.scroll_offset).abs() <= self.options.scroll_epsilon {
            return false;
        }
        self.scroll_offset = target;
        true
    }

    /// Force the offset without the epsilon check (host-reported scroll position).
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset;
        self.clamp_scroll();
    }

    /// Bring the row at `index` into view.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> bool {
        let Some(item) = self.item(index) else {
            return false;
        };
        let target = match align {
            ScrollAlign::Start => item.start,
            ScrollAlign::End => item.end() - self.viewport,
            ScrollAlign::Center => item.start + item.size / 2.0 - self.viewport / 2.0,
            ScrollAlign::Auto => {
                if item.start < self.scroll_offset {
                    item.start
                } else if item.end() > self.scroll_offset + self.viewport {
                    item.end() - self.viewport
                } else {
                    return false;
                }
            }
        };
        self.scroll_to_offset(target)
    }
}
