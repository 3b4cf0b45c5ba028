//! jot - AI-assisted Markdown notes in the terminal
//!
//! A terminal user interface for writing and organizing short Markdown
//! notes with tags. Notes live in a single JSON slot in the platform data
//! directory and every change is written through immediately, so closing
//! the terminal never loses work.
//!
//! jot gives note-takers:
//! - A searchable, most-recent-first note list with tag filtering
//! - A three-field editor (title, Markdown content, tags) with live preview
//! - Optional AI title suggestions from the note content
//! - Optional speech capture through an external transcriber command

use crate::app::App;
use crate::handlers::speech::{CommandEngine, TranscriptionEngine};
use crate::models::{AppConfig, PersistentStore};
use color_eyre::Result;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};
use std::error::Error;
use std::io::{self};
use std::sync::Arc;
use std::time::Duration;

mod app;
mod handlers;
mod models;
mod search;
mod selection;
mod ui;

/// Application entry point and initialization
/// Opens the store, wires the optional collaborators from the config, sets
/// up the terminal, and runs the main loop. The terminal is restored on the
/// way out even when the loop errors.
fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;

    let store = PersistentStore::open()?;
    init_logging(&store);
    let config = AppConfig::load(&store);

    let engine: Option<Box<dyn TranscriptionEngine>> = config
        .transcriber_command
        .as_ref()
        .map(|command| {
            Box::new(CommandEngine::new(command.clone(), config.locale.clone()))
                as Box<dyn TranscriptionEngine>
        });

    let mut app = App::new(store, config, engine);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    // Never leave a recorder running past the UI.
    app.stop_listening();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let mut should_quit = false;

    while !should_quit {
        if app.needs_redraw {
            terminal.draw(|frame| app.render(frame))?;
            app.needs_redraw = false;
        }

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                should_quit = handlers::keys::handle_key_events(key, app);
            }
        }

        // Drain the collaborator channels once per iteration.
        app.tick();
    }

    Ok(())
}

/// Logs go to a file in the data directory; the terminal belongs to the UI.
/// Logging being unavailable is not worth failing startup over.
fn init_logging(store: &PersistentStore) {
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(store.data_dir().join("jot.log"));

    if let Ok(file) = log_file {
        let _ = tracing_subscriber::fmt()
            .with_writer(Arc::new(file))
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .try_init();
    }
}
