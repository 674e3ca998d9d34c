//! Row selection controller.
//!
//! # Overview
//!
//! Input capture is the host's job; this module only interprets already-captured intents
//! ([`SelectionIntent`]) into transitions of an [`ImmutableSelectionSet`]. Range resolution and
//! focus movement go through the host-supplied [`RowOrder`], so ranges follow the *visible*
//! (sorted/filtered) order rather than storage order.
//!
//! # Pointer semantics
//!
//! | mode | modifiers | result |
//! |---|---|---|
//! | Single | any | clicking the sole selected key clears; otherwise select `{key}`, anchor = key |
//! | Multiple | Shift+Toggle | add `[anchor..key]`, anchor unchanged |
//! | Multiple | Toggle | toggle `key`, anchor = key |
//! | Multiple | Shift | replace with `[anchor..key]`, anchor unchanged |
//! | Multiple | none | select `{key}`, anchor = key |
//!
//! The "toggle" modifier is Ctrl, or Cmd on macOS (see [`Platform`]). Alt, or the platform's
//! other meta key, makes the click a no-op.

use crate::model::RowSelectionMode;
use crate::selection_set::ImmutableSelectionSet;
use std::hash::Hash;

/// Host platform, used to pick the toggle modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// macOS: Cmd toggles, Ctrl is reserved.
    Mac,
    /// Everything else: Ctrl toggles, Meta is reserved.
    #[default]
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    /// Split raw modifiers into `(toggle, reserved)` according to platform convention.
    pub fn remap(self, modifiers: Modifiers) -> (bool, bool) {
        match self {
            Platform::Mac => (modifiers.meta, modifiers.ctrl),
            Platform::Other => (modifiers.ctrl, modifiers.meta),
        }
    }
}

/// Raw modifier state of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt/Option held.
    pub alt: bool,
    /// Meta/Cmd/Super held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Shift only.
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    /// Control only.
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Meta only.
    pub const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    /// Alt only.
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Control and Shift.
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
        ..Modifiers::NONE
    };
}

/// Keys the selection controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// Space bar.
    Space,
    /// Enter/Return.
    Enter,
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Escape.
    Escape,
}

/// A captured selection input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent<K> {
    /// Pointer pressed on the row identified by `key`.
    PointerDown {
        /// Row key under the pointer.
        key: K,
        /// Modifier state.
        modifiers: Modifiers,
    },
    /// Key pressed while the row identified by `key` has focus.
    KeyDown {
        /// Focused row key.
        key: K,
        /// Key pressed.
        nav: NavKey,
        /// Modifier state.
        modifiers: Modifiers,
    },
}

/// Host-supplied view-order queries.
pub trait RowOrder<K> {
    /// Keys spanned by `from..=to` in the current sorted/filtered order (either direction).
    ///
    /// Returns an empty list when either key is not part of the current view.
    fn between(&self, from: &K, to: &K) -> Vec<K>;

    /// The key `offset` rows away from `key` in view order, if it exists.
    fn focus_offset(&self, key: &K, offset: isize) -> Option<K>;
}

/// Grid state the controller needs but does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext<K> {
    /// Row holding the cell currently in `Editing`, if any.
    pub editing_row: Option<K>,
    /// Whether cell editing is enabled (Enter then requests an edit instead of toggling).
    pub edit_cells_allowed: bool,
}

impl<K> Default for SelectionContext<K> {
    fn default() -> Self {
        Self {
            editing_row: None,
            edit_cells_allowed: false,
        }
    }
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome<K> {
    /// The intent was consumed (the host should suppress default handling).
    pub handled: bool,
    /// The selected set changed.
    pub selection_changed: bool,
    /// The host should move keyboard focus to this row.
    pub focus: Option<K>,
    /// The host should start editing the first editable cell of this row.
    pub edit_row: Option<K>,
    /// Focus should leave the rows and return to the grid container.
    pub escape: bool,
}

impl<K> SelectionOutcome<K> {
    fn ignored() -> Self {
        Self {
            handled: false,
            selection_changed: false,
            focus: None,
            edit_row: None,
            escape: false,
        }
    }

    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::ignored()
        }
    }
}

/// Result of resolving a pointer press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerResolution<K: Clone + Eq + Hash> {
    /// The new selection.
    pub selection: ImmutableSelectionSet<K>,
    /// Whether the pressed key becomes the new anchor.
    pub set_anchor: bool,
}

/// Resolve a pointer press into a new selection.
///
/// Pure function: `selected` is never modified. Returns `None` when the press must be ignored.
pub fn resolve_pointer_down<K: Clone + Eq + Hash>(
    mode: RowSelectionMode,
    platform: Platform,
    selected: &ImmutableSelectionSet<K>,
    anchor: Option<&K>,
    key: &K,
    modifiers: Modifiers,
    order: &dyn RowOrder<K>,
) -> Option<PointerResolution<K>> {
    let (toggle, reserved) = platform.remap(modifiers);
    if reserved || modifiers.alt {
        return None;
    }

    match mode {
        RowSelectionMode::None => None,
        RowSelectionMode::Single => {
            let selection = if selected.sole() == Some(key) {
                ImmutableSelectionSet::empty()
            } else {
                ImmutableSelectionSet::just([key.clone()])
            };
            Some(PointerResolution {
                selection,
                set_anchor: true,
            })
        }
        RowSelectionMode::Multiple => {
            // Without an anchor, a range click degenerates to the pressed key.
            let range_from = anchor.unwrap_or(key);
            if modifiers.shift && toggle {
                Some(PointerResolution {
                    selection: selected.add(order.between(range_from, key)),
                    set_anchor: anchor.is_none(),
                })
            } else if toggle {
                Some(PointerResolution {
                    selection: selected.toggle(key),
                    set_anchor: true,
                })
            } else if modifiers.shift {
                Some(PointerResolution {
                    selection: ImmutableSelectionSet::just(order.between(range_from, key)),
                    set_anchor: anchor.is_none(),
                })
            } else {
                Some(PointerResolution {
                    selection: ImmutableSelectionSet::just([key.clone()]),
                    set_anchor: true,
                })
            }
        }
    }
}

/// Owns the selected set, anchor and focused row for one grid instance.
#[derive(Debug, Clone)]
pub struct SelectionController<K: Clone + Eq + Hash> {
    mode: RowSelectionMode,
    platform: Platform,
    selected: ImmutableSelectionSet<K>,
    anchor: Option<K>,
    focused: Option<K>,
}

impl<K: Clone + Eq + Hash> SelectionController<K> {
    /// Create a controller with an empty selection.
    pub fn new(mode: RowSelectionMode, platform: Platform) -> Self {
        Self {
            mode,
            platform,
            selected: ImmutableSelectionSet::empty(),
            anchor: None,
            focused: None,
        }
    }

    /// Row selection mode.
    pub fn mode(&self) -> RowSelectionMode {
        self.mode
    }

    /// Change the row selection mode; the selection is cleared.
    pub fn set_mode(&mut self, mode: RowSelectionMode) {
        self.mode = mode;
        self.reset();
    }

    /// The current selection snapshot.
    pub fn selected(&self) -> &ImmutableSelectionSet<K> {
        &self.selected
    }

    /// The current anchor.
    pub fn anchor(&self) -> Option<&K> {
        self.anchor.as_ref()
    }

    /// The row that last received keyboard focus through the controller.
    pub fn focused(&self) -> Option<&K> {
        self.focused.as_ref()
    }

    /// Record focus moved by the host (e.g. a pointer press outside the controller).
    pub fn set_focused(&mut self, key: Option<K>) {
        self.focused = key;
    }

    /// Whether `key` is selected.
    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.has(key)
    }

    /// Replace the selection wholesale (host override). Returns whether it changed.
    pub fn set_selection<I>(&mut self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
    {
        let next = ImmutableSelectionSet::just(keys);
        self.replace(next)
    }

    /// Clear selection, anchor and focus.
    pub fn reset(&mut self) -> bool {
        self.anchor = None;
        self.focused = None;
        self.replace(ImmutableSelectionSet::empty())
    }

    /// Drop keys rejected by `keep` (and the anchor/focus if they are dropped).
    pub fn prune<F>(&mut self, keep: F) -> bool
    where
        F: Fn(&K) -> bool,
    {
        if self.anchor.as_ref().is_some_and(|a| !keep(a)) {
            self.anchor = None;
        }
        if self.focused.as_ref().is_some_and(|f| !keep(f)) {
            self.focused = None;
        }
        let next = self.selected.retain(|k| keep(k));
        self.replace(next)
    }

    fn replace(&mut self, next: ImmutableSelectionSet<K>) -> bool {
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    /// Apply one captured intent.
    pub fn handle(
        &mut self,
        intent: SelectionIntent<K>,
        ctx: &SelectionContext<K>,
        order: &dyn RowOrder<K>,
    ) -> SelectionOutcome<K> {
        match intent {
            SelectionIntent::PointerDown { key, modifiers } => {
                self.pointer_down(key, modifiers, ctx, order)
            }
            SelectionIntent::KeyDown { key, nav, .. } => self.key_down(key, nav, ctx, order),
        }
    }

    fn pointer_down(
        &mut self,
        key: K,
        modifiers: Modifiers,
        ctx: &SelectionContext<K>,
        order: &dyn RowOrder<K>,
    ) -> SelectionOutcome<K> {
        if self.mode == RowSelectionMode::None {
            return SelectionOutcome::ignored();
        }
        if ctx.editing_row.as_ref() == Some(&key) {
            return SelectionOutcome::ignored();
        }

        let Some(resolution) = resolve_pointer_down(
            self.mode,
            self.platform,
            &self.selected,
            self.anchor.as_ref(),
            &key,
            modifiers,
            order,
        ) else {
            return SelectionOutcome::ignored();
        };

        let mut outcome = SelectionOutcome::handled();
        outcome.selection_changed = self.replace(resolution.selection);
        if resolution.set_anchor {
            self.anchor = Some(key.clone());
            self.focused = Some(key.clone());
            outcome.focus = Some(key);
        }
        outcome
    }

    fn key_down(
        &mut self,
        key: K,
        nav: NavKey,
        ctx: &SelectionContext<K>,
        order: &dyn RowOrder<K>,
    ) -> SelectionOutcome<K> {
        if ctx.editing_row.is_some() || self.mode == RowSelectionMode::None {
            return SelectionOutcome::ignored();
        }

        let mut outcome = SelectionOutcome::handled();
        match nav {
            NavKey::Escape => {
                self.focused = None;
                outcome.escape = true;
            }
            NavKey::Enter if ctx.edit_cells_allowed => {
                outcome.edit_row = Some(key);
            }
            NavKey::Space | NavKey::Enter => {
                let next = match self.mode {
                    RowSelectionMode::Single if self.selected.has(&key) => {
                        ImmutableSelectionSet::empty()
                    }
                    RowSelectionMode::Single => ImmutableSelectionSet::just([key.clone()]),
                    _ => self.selected.toggle(&key),
                };
                outcome.selection_changed = self.replace(next);
            }
            NavKey::ArrowUp | NavKey::ArrowDown => {
                let offset = if nav == NavKey::ArrowUp { -1 } else { 1 };
                let Some(target) = order.focus_offset(&key, offset) else {
                    return SelectionOutcome::ignored();
                };
                if self.mode == RowSelectionMode::Single && self.selected.has(&key) {
                    outcome.selection_changed =
                        self.replace(ImmutableSelectionSet::just([target.clone()]));
                }
                self.focused = Some(target.clone());
                outcome.focus = Some(target);
            }
        }
        outcome
    }
}
