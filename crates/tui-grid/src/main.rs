//! TUI data-grid demo
//!
//! A terminal data grid built with crossterm and ratatui on top of `grid-core`. Edits are
//! answered by an in-process authority running on a worker thread.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tui-grid                 # 10 000 generated rows
//! cargo run -p tui-grid -- grid.json    # a GridInfo document
//! ```
//!
//! # Logging
//!
//! `tracing` output goes to the file named by `TUI_GRID_LOG` (filtered by `RUST_LOG`), so the
//! terminal UI is never written over:
//!
//! ```bash
//! TUI_GRID_LOG=grid.log RUST_LOG=grid_core=debug cargo run -p tui-grid
//! ```
//!
//! # Keys
//!
//! - Up/Down: move focus (drags a single selection along)
//! - Left/Right: move the column cursor
//! - Space: toggle the focused row
//! - Click / Shift+click / Ctrl+click: select, extend, toggle (Cmd on macOS)
//! - Click a header: sort (Shift for multi-column)
//! - e / Enter: edit the focused cell
//! - Typing edits; Tab/Shift+Tab, Enter/Shift+Enter and Esc commit; Ctrl+Z discards
//! - s / S: toggle sort on the focused column (S adds to the sort)
//! - /: filter the focused column (`min..max` on numeric columns)
//! - PageUp/PageDown, mouse wheel: scroll
//! - q: quit

mod app;
mod sample;

use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use grid_core::GridInfo;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    env, fs,
    io::{self, stdout},
    process,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

const SAMPLE_ROWS: usize = 10_000;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn configure_logging() -> io::Result<()> {
    let Some(path) = env::var_os("TUI_GRID_LOG") else {
        return Ok(());
    };
    let file = fs::File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn load_info(path: Option<String>) -> Result<GridInfo, String> {
    let Some(path) = path else {
        return Ok(sample::sample_info(SAMPLE_ROWS));
    };
    let json = fs::read_to_string(&path).map_err(|err| format!("{path}: {err}"))?;
    let info = GridInfo::from_json(&json).map_err(|err| format!("{path}: {err}"))?;
    info.validate().map_err(|err| format!("{path}: {err}"))?;
    Ok(info)
}

fn main() -> io::Result<()> {
    configure_logging()?;

    let info = match load_info(env::args().nth(1)) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };
    let mut app = match App::new(info) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };
    tracing::info!("tui-grid started");

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                // The next draw picks up the new size.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}
