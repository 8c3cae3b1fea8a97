//! Main event loop for the TUI.
//!
//! This module contains the core event loop that multiplexes terminal input,
//! loader completions, routing requests, and periodic ticks.

use crate::app::{App, AppChannels, SPINNER_FRAMES};
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::{handle_app_event, handle_articles_loaded, handle_sources_loaded};
use super::input::handle_input;
use super::render::render;

/// Result of handling a key press event.
///
/// Returned by input handlers to signal whether the application should
/// continue running or terminate gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI application event loop.
///
/// Uses `tokio::select!` to multiplex these event sources:
/// - **Terminal input**: Key presses from crossterm's async event stream
/// - **Article and source loaders**: [`crate::api::Loaded`] completions
/// - **Routing**: [`crate::app::AppEvent`] requests raised by the interactors
/// - **Periodic tick**: 250ms timer for the spinner, status expiry and the
///   favorites digest
///
/// All state changes happen on this task, one message at a time.
///
/// # Panic Safety
///
/// Installs a panic hook that restores terminal state before unwinding,
/// ensuring the terminal is not left in raw mode on panic.
pub async fn run(app: &mut App, mut channels: AppChannels) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    app.start();

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain routing requests before more input so navigation raised by
        // the last key press is applied first.
        while let Ok(event) = channels.events.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        if handle_input(app, key.code, key.modifiers) == Action::Quit {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(_, _))) => app.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal input error");
                        break;
                    }
                    None => break,
                }
            }

            Some(event) = channels.events.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event);
            }

            Some(loaded) = channels.articles.recv() => {
                app.needs_redraw = true;
                handle_articles_loaded(app, loaded);
            }

            Some(loaded) = channels.sources.recv() => {
                app.needs_redraw = true;
                handle_sources_loaded(app, loaded);
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Periodic housekeeping: spinner animation and due digests.
fn handle_tick(app: &mut App) {
    if app.is_loading() || app.activity.is_active() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }

    if let Some(digest) = app.digest.take_due(Local::now().naive_local()) {
        app.set_status(format!("{}: {}", digest.title, digest.body));
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
