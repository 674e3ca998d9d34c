//! Application state: maps terminal input onto grid intents and draws the render model.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use grid_core::{
    CellState, ColumnFilter, CommitTrigger, EditIntent, EditKey, FilterValue, GridController,
    GridError, GridInfo, Modifiers, NavKey, RenderCell, RenderModel, RowKey, RowOrder,
    RowSelectionMode, SelectionIntent, cell_text,
};
use grid_core_wire::InProcessAuthority;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::sample::demo_handler;

const MIN_COLUMN_WIDTH: usize = 4;
const MAX_COLUMN_WIDTH: usize = 24;
/// Rows scanned when sizing columns.
const WIDTH_SAMPLE_ROWS: usize = 200;
/// Simulated round trip of the in-process authority, long enough to see `EditSaving`.
const AUTHORITY_LATENCY: Duration = Duration::from_millis(250);
const WHEEL_STEP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Filter,
}

/// Demo application state.
pub struct App {
    grid: GridController,
    authority: InProcessAuthority,
    column_widths: Vec<usize>,
    focus_column: usize,
    input_mode: InputMode,
    input_buffer: String,
    status_message: String,
    published: Arc<Mutex<Vec<usize>>>,
    /// Inner table area of the last frame (header line included).
    table_area: Rect,
    pub should_quit: bool,
}

impl App {
    /// Bind `info` to a grid answered by the in-process demo authority.
    pub fn new(mut info: GridInfo) -> Result<Self, GridError> {
        // One terminal line per row.
        info.payload.options.estimate_row_size = 1.0;
        let column_widths = column_widths(&info);
        let handler = demo_handler(info.payload.type_hints.clone());

        let mut grid = GridController::new(info)?;
        let published = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&published);
        grid.subscribe(move |change| {
            tracing::debug!(rows = change.rows.len(), "selection published");
            if let Ok(mut rows) = sink.lock() {
                *rows = change.rows.clone();
            }
        });

        let first = grid.row_model().key_at(0);
        grid.set_focused_row(first);

        Ok(Self {
            grid,
            authority: InProcessAuthority::with_latency(handler, AUTHORITY_LATENCY),
            column_widths,
            focus_column: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            status_message: String::new(),
            published,
            table_area: Rect::default(),
            should_quit: false,
        })
    }

    /// Exchange patches with the authority.
    pub fn tick(&mut self) {
        let resolved = self.grid.drive(&mut self.authority);
        if resolved > 0 {
            tracing::debug!(resolved, "patch replies applied");
        }
    }

    fn focused_row(&self) -> Option<RowKey> {
        self.grid.selection().focused().copied()
    }

    fn report<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.status_message = err.to_string();
                None
            }
        }
    }

    // ---- keyboard ----

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        self.status_message.clear();

        if self.input_mode == InputMode::Filter {
            self.handle_filter_key(key);
        } else if self.grid.editing().is_some() {
            self.handle_edit_key(key);
        } else {
            self.handle_normal_key(key);
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let modifiers = to_modifiers(key.modifiers);
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.move_focus(NavKey::ArrowUp, modifiers),
            KeyCode::Down => self.move_focus(NavKey::ArrowDown, modifiers),
            KeyCode::Left => self.focus_column = self.focus_column.saturating_sub(1),
            KeyCode::Right => {
                let last = self.grid.columns().len().saturating_sub(1);
                self.focus_column = (self.focus_column + 1).min(last);
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                let page = self.grid.virtualizer().viewport().max(1.0);
                let offset = self.grid.virtualizer().scroll_offset();
                let target = if key.code == KeyCode::PageUp {
                    offset - page
                } else {
                    offset + page
                };
                self.grid.scroll_to_offset(target.max(0.0));
            }
            KeyCode::Home => {
                let first = self.grid.row_model().key_at(0);
                self.grid.set_focused_row(first);
            }
            KeyCode::End => {
                let last = self.grid.row_model().len().checked_sub(1);
                let key = last.and_then(|p| self.grid.row_model().key_at(p));
                self.grid.set_focused_row(key);
            }
            KeyCode::Char(' ') => self.press_on_focus(NavKey::Space, modifiers),
            KeyCode::Esc => self.press_on_focus(NavKey::Escape, modifiers),
            KeyCode::Enter | KeyCode::Char('e') => {
                if self.grid.options().editable {
                    self.start_edit();
                } else if key.code == KeyCode::Enter {
                    self.press_on_focus(NavKey::Enter, modifiers);
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let multi = key.code == KeyCode::Char('S');
                let result = self.grid.toggle_sort(self.focus_column, multi);
                self.report(result);
            }
            KeyCode::Char('/') => {
                self.input_buffer = self
                    .grid
                    .filters()
                    .iter()
                    .find(|f| f.column == self.focus_column)
                    .map(|f| filter_to_input(&f.value))
                    .unwrap_or_default();
                self.input_mode = InputMode::Filter;
            }
            _ => {}
        }
    }

    fn move_focus(&mut self, nav: NavKey, modifiers: Modifiers) {
        let Some(focus) = self.focused_row() else {
            let first = self.grid.row_model().key_at(0);
            self.grid.set_focused_row(first);
            return;
        };
        let outcome = self.grid.dispatch_selection(SelectionIntent::KeyDown {
            key: focus,
            nav,
            modifiers,
        });
        if !outcome.handled && self.grid.selection().mode() == RowSelectionMode::None {
            // Row selection is off: move the focus ourselves.
            let offset = if nav == NavKey::ArrowUp { -1 } else { 1 };
            if let Some(target) = self.grid.row_model().focus_offset(&focus, offset) {
                self.grid.set_focused_row(Some(target));
            }
        }
    }

    fn press_on_focus(&mut self, nav: NavKey, modifiers: Modifiers) {
        if let Some(focus) = self.focused_row() {
            self.grid.dispatch_selection(SelectionIntent::KeyDown {
                key: focus,
                nav,
                modifiers,
            });
        }
    }

    fn start_edit(&mut self) {
        let Some(focus) = self.focused_row() else {
            return;
        };
        let key = EditKey::new(focus.get(), self.focus_column);
        let result = self.grid.dispatch_edit(EditIntent::Activate(key));
        self.report(result);
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let intent = match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => EditIntent::Commit(CommitTrigger::Escape),
            (_, KeyCode::Tab) => EditIntent::Commit(CommitTrigger::Tab { reverse: false }),
            (_, KeyCode::BackTab) => EditIntent::Commit(CommitTrigger::Tab { reverse: true }),
            (mods, KeyCode::Enter) => EditIntent::Commit(CommitTrigger::Enter {
                reverse: mods.contains(KeyModifiers::SHIFT),
            }),
            (KeyModifiers::CONTROL, KeyCode::Char('z')) => EditIntent::Cancel,
            (_, KeyCode::Backspace) => {
                let mut text = self.editing_text();
                text.pop();
                EditIntent::Input(text)
            }
            (mods, KeyCode::Char(c)) if !mods.contains(KeyModifiers::CONTROL) => {
                let mut text = self.editing_text();
                text.push(c);
                EditIntent::Input(text)
            }
            _ => return,
        };

        let result = self.grid.dispatch_edit(intent);
        if let Some(Some(next)) = self.report(result) {
            self.focus_column = next.column_index;
            self.grid.set_focused_row(Some(RowKey(next.row_index)));
        }
    }

    fn editing_text(&self) -> String {
        self.grid
            .editing()
            .and_then(|key| self.grid.edit_record(key))
            .map(|record| record.value.clone())
            .unwrap_or_default()
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                let input = std::mem::take(&mut self.input_buffer);
                self.apply_filter(&input);
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn apply_filter(&mut self, input: &str) {
        let column = self.focus_column;
        let numeric = self
            .grid
            .columns()
            .get(column)
            .is_some_and(|c| c.type_hint.is_numeric());

        let mut filters: Vec<ColumnFilter> = self
            .grid
            .filters()
            .iter()
            .filter(|f| f.column != column)
            .cloned()
            .collect();
        if let Some(value) = parse_filter(input, numeric) {
            filters.push(ColumnFilter::new(column, value));
        }
        let result = self.grid.set_filters(filters);
        if self.report(result).is_some() && self.focused_row().is_none() {
            let first = self.grid.row_model().key_at(0);
            self.grid.set_focused_row(first);
        }
    }

    // ---- mouse ----

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        let area = self.table_area;
        match mouse.kind {
            MouseEventKind::ScrollUp => {
                let offset = self.grid.virtualizer().scroll_offset();
                self.grid.scroll_to_offset((offset - WHEEL_STEP).max(0.0));
            }
            MouseEventKind::ScrollDown => {
                let offset = self.grid.virtualizer().scroll_offset();
                self.grid.scroll_to_offset(offset + WHEEL_STEP);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if !area_contains(area, mouse.column, mouse.row) {
                    return;
                }
                self.status_message.clear();
                let column = self.column_at(mouse.column - area.x);
                let modifiers = to_modifiers(mouse.modifiers);

                if mouse.row == area.y {
                    if let Some(column) = column {
                        let result = self.grid.toggle_sort(column, modifiers.shift);
                        self.report(result);
                    }
                    return;
                }

                let line = f64::from(mouse.row - area.y - 1);
                let Some(key) = self.row_at_line(line) else {
                    return;
                };
                if let Some(column) = column {
                    self.focus_column = column;
                }
                let outcome = self
                    .grid
                    .dispatch_selection(SelectionIntent::PointerDown { key, modifiers });
                if !outcome.handled {
                    self.grid.set_focused_row(Some(key));
                }
            }
            _ => {}
        }
    }

    fn row_at_line(&self, line: f64) -> Option<RowKey> {
        let offset = self.grid.virtualizer().scroll_offset() + line;
        let model = self.grid.render_model();
        model
            .rows
            .iter()
            .find(|row| row.start <= offset && offset < row.start + row.size)
            .map(|row| row.key)
    }

    fn column_at(&self, x: u16) -> Option<usize> {
        let mut left = 0usize;
        for (index, width) in self.column_widths.iter().enumerate() {
            let right = left + width + 1;
            if usize::from(x) < right {
                return Some(index);
            }
            left = right;
        }
        None
    }

    // ---- rendering ----

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let block = Block::default().borders(Borders::ALL).title(" tui-grid ");
        let inner = block.inner(chunks[0]);
        self.table_area = inner;

        let viewport = f64::from(inner.height.saturating_sub(1));
        if self.grid.virtualizer().viewport() != viewport {
            self.grid.set_viewport(viewport);
        }

        let model = self.grid.render_model();
        frame.render_widget(block, chunks[0]);
        self.render_table(frame, inner, &model);
        self.render_status_line(frame, chunks[1], &model);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        if area.height == 0 {
            return;
        }

        let header: Vec<Span> = model
            .columns
            .iter()
            .zip(&self.column_widths)
            .flat_map(|(column, &width)| {
                let marker = match column.sort {
                    Some((rank, spec)) => {
                        let arrow = if spec.descending { '▼' } else { '▲' };
                        if model.columns.iter().filter(|c| c.sort.is_some()).count() > 1 {
                            format!("{arrow}{}", rank + 1)
                        } else {
                            arrow.to_string()
                        }
                    }
                    None => String::new(),
                };
                let filter = if column.filtered { "*" } else { "" };
                let label = format!("{}{filter}{marker}", column.name);
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if column.index == self.focus_column {
                    style = style.fg(Color::Cyan);
                }
                [Span::styled(fit_width(&label, width), style), Span::raw(" ")]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(header)),
            Rect { height: 1, ..area },
        );

        let body_height = f64::from(area.height - 1);
        for row in &model.rows {
            let line = (row.start - model.scroll_offset).floor();
            if line < 0.0 || line >= body_height {
                continue;
            }

            let mut row_style = Style::default();
            if row.selected {
                row_style = row_style.bg(Color::DarkGray);
            }
            if row.focused {
                row_style = row_style.add_modifier(Modifier::BOLD);
            }

            let spans: Vec<Span> = row
                .cells
                .iter()
                .zip(&self.column_widths)
                .flat_map(|(cell, &width)| {
                    let focused = row.focused && cell.column_index == self.focus_column;
                    let text = if cell.is_editing() {
                        format!("{}▏", cell.text)
                    } else {
                        cell.text.clone()
                    };
                    [
                        Span::styled(fit_width(&text, width), cell_style(cell, row_style, focused)),
                        Span::styled(" ", row_style),
                    ]
                })
                .collect();

            let rect = Rect {
                y: area.y + 1 + line as u16,
                height: 1,
                ..area
            };
            frame.render_widget(Paragraph::new(Line::from(spans)).style(row_style), rect);
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect, model: &RenderModel) {
        let focused_cell = self
            .focused_row()
            .and_then(|key| model.cell(key, self.focus_column));

        let status_text = if self.input_mode == InputMode::Filter {
            let name = self
                .grid
                .columns()
                .get(self.focus_column)
                .map(|c| c.name.as_str())
                .unwrap_or_default();
            format!("Filter [{name}] > {}  (Enter=Apply, Esc=Cancel, min..max on numbers)", self.input_buffer)
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(title) = focused_cell.and_then(|c| c.error_title.as_deref()) {
            format!("Edit failed: {title}")
        } else {
            let selected = self.published.lock().map(|rows| rows.len()).unwrap_or(0);
            let summary = model
                .summary
                .clone()
                .unwrap_or_else(|| format!("{} rows", model.row_count));
            format!(
                "{summary} | filtered from {} | selected: {selected} | saving: {} | version: {}",
                model.dataset_row_count,
                self.grid.pending_patches(),
                model.version
            )
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.grid.editing().is_some() {
            "Enter/Shift-Enter:commit+down/up  Tab/Shift-Tab:commit+next/prev  Esc:commit  Ctrl-Z:discard"
        } else {
            "q:quit  arrows:move  Space:toggle  click/Shift/Ctrl:select  e/Enter:edit  s/S:sort  /:filter  PgUp/PgDn:scroll"
        };
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

fn cell_style(cell: &RenderCell, row_style: Style, focused: bool) -> Style {
    // Keyed on the engine's style hook so every renderer themes the same class names.
    let mut style = match cell.state.class_name() {
        Some("cell-edit-editing") => row_style.bg(Color::Blue).fg(Color::White),
        Some("cell-edit-saving") => row_style.fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        Some("cell-edit-success") => row_style.fg(Color::Green),
        Some("cell-edit-failure") => row_style
            .fg(Color::Red)
            .add_modifier(Modifier::UNDERLINED),
        _ => row_style,
    };
    if focused && cell.state != CellState::Editing {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn to_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: mods.contains(KeyModifiers::SHIFT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        meta: mods.contains(KeyModifiers::SUPER) || mods.contains(KeyModifiers::META),
    }
}

fn area_contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

/// Column widths from the header and a sample of rows.
fn column_widths(info: &GridInfo) -> Vec<usize> {
    info.payload
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let widest = info
                .payload
                .data
                .iter()
                .take(WIDTH_SAMPLE_ROWS)
                .filter_map(|row| row.get(index))
                .map(|value| cell_text(value).width())
                .max()
                .unwrap_or(0);
            // Room for the sort/filter markers.
            (name.width() + 3)
                .max(widest)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect()
}

/// Truncate `text` to `width` display columns (with an ellipsis) and pad it to exactly `width`.
pub fn fit_width(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    if text.width() <= width {
        out.push_str(text);
        used = text.width();
    } else {
        for ch in text.chars() {
            let w = ch.width().unwrap_or(0);
            if used + w > width - 1 {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('…');
        used += 1;
    }
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

/// Parse filter input: empty clears, `min..max` (either side optional) is a range on numeric
/// columns, anything else is a text filter.
pub fn parse_filter(input: &str, numeric: bool) -> Option<FilterValue> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if numeric && let Some((lo, hi)) = input.split_once("..") {
        let bound = |s: &str| s.trim().parse::<f64>().ok();
        let (min, max) = (bound(lo), bound(hi));
        if min.is_some() || max.is_some() {
            return Some(FilterValue::range(min, max));
        }
    }
    Some(FilterValue::text(input))
}

fn filter_to_input(value: &FilterValue) -> String {
    match value {
        FilterValue::Text { text } => text.clone(),
        FilterValue::Range { min, max } => format!(
            "{}..{}",
            min.map(|n| n.to_string()).unwrap_or_default(),
            max.map(|n| n.to_string()).unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_info;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_fit_width_pads_and_truncates() {
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdef", 4), "abc…");
        // Wide characters count two columns.
        assert_eq!(fit_width("日本語", 4), "日… ");
        assert_eq!(fit_width("x", 0), "");
    }

    #[test]
    fn test_cell_style_follows_edit_class() {
        let mut cell = RenderCell {
            column_index: 0,
            value: serde_json::Value::Null,
            text: String::new(),
            state: CellState::EditFailure,
            error_title: Some("out of range".into()),
        };
        let failed = cell_style(&cell, Style::default(), false);
        assert_eq!(failed.fg, Some(Color::Red));
        assert!(failed.add_modifier.contains(Modifier::UNDERLINED));

        cell.state = CellState::Ready;
        assert_eq!(cell_style(&cell, Style::default(), false), Style::default());
        assert!(
            cell_style(&cell, Style::default(), true)
                .add_modifier
                .contains(Modifier::REVERSED)
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter("  ", true), None);
        assert_eq!(
            parse_filter("10..20", true),
            Some(FilterValue::range(Some(10.0), Some(20.0)))
        );
        assert_eq!(
            parse_filter("..5", true),
            Some(FilterValue::range(None, Some(5.0)))
        );
        assert_eq!(parse_filter("10..20", false), Some(FilterValue::text("10..20")));
        assert_eq!(parse_filter("osa", false), Some(FilterValue::text("osa")));
        assert_eq!(
            filter_to_input(&FilterValue::range(Some(1.5), None)),
            "1.5.."
        );
    }

    #[test]
    fn test_keys_drive_selection_and_sort() {
        let mut app = App::new(sample_info(20)).unwrap();
        app.grid.set_viewport(5.0);
        assert_eq!(app.focused_row(), Some(RowKey(0)));

        app.handle_key_event(press(KeyCode::Down));
        app.handle_key_event(press(KeyCode::Char(' ')));
        assert_eq!(app.focused_row(), Some(RowKey(1)));
        assert_eq!(*app.published.lock().unwrap(), vec![1]);

        app.handle_key_event(press(KeyCode::Char('s')));
        // Numeric id column sorts descending first.
        assert_eq!(app.grid.row_model().key_at(0), Some(RowKey(19)));
    }

    #[test]
    fn test_arrowing_past_the_bottom_scrolls_one_line() {
        let mut app = App::new(sample_info(20)).unwrap();
        app.grid.set_viewport(5.0);
        for _ in 0..5 {
            app.handle_key_event(press(KeyCode::Down));
        }
        assert_eq!(app.focused_row(), Some(RowKey(5)));
        assert_eq!(app.grid.virtualizer().scroll_offset(), 1.0);
        assert_eq!(app.grid.virtualizer().visible_range(), Some(1..6));
    }

    #[test]
    fn test_typing_edits_the_focused_cell() {
        let mut app = App::new(sample_info(5)).unwrap();
        app.grid.set_viewport(5.0);
        app.handle_key_event(press(KeyCode::Right));
        app.handle_key_event(press(KeyCode::Char('e')));
        assert_eq!(app.grid.editing(), Some(EditKey::new(0, 1)));

        app.handle_key_event(press(KeyCode::Backspace));
        app.handle_key_event(press(KeyCode::Char('!')));
        assert_eq!(app.editing_text(), "Lisbo!");

        app.handle_key_event(press(KeyCode::Tab));
        assert_eq!(app.grid.editing(), Some(EditKey::new(0, 2)));
        assert_eq!(app.focus_column, 2);
        assert_eq!(app.grid.cell_state(EditKey::new(0, 1)), CellState::EditSaving);
    }

    #[test]
    fn test_filter_prompt_applies_range() {
        let mut app = App::new(sample_info(30)).unwrap();
        app.handle_key_event(press(KeyCode::Char('/')));
        for c in "..9".chars() {
            app.handle_key_event(press(KeyCode::Char(c)));
        }
        app.handle_key_event(press(KeyCode::Enter));
        assert_eq!(app.grid.row_model().len(), 10);
        assert_eq!(
            app.grid.filters(),
            &[ColumnFilter::new(0, FilterValue::range(None, Some(9.0)))]
        );
    }
}
