//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on the open overlay and the current screen.

use crate::app::{App, Overlay, Screen};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::news::Segment;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: isize = 10;

/// Main input dispatch function.
///
/// Overlays capture all keys while visible; otherwise the key is resolved
/// against the current screen's bindings.
pub fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match &app.overlay {
        Some(Overlay::Help) => return handle_help_input(app, code),
        Some(_) => return handle_overlay_input(app, code, modifiers),
        None => {}
    }

    match app.screen {
        Screen::News => handle_news_input(app, code, modifiers),
        Screen::Sources => handle_sources_input(app, code, modifiers),
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.overlay = None;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input for the action sheet, settings menu and filter selectors.
fn handle_overlay_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Overlay);

    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::Back) => app.overlay = None,
        Some(KbAction::NavDown) => move_overlay(app, 1),
        Some(KbAction::NavUp) => move_overlay(app, -1),
        Some(KbAction::PageDown) => move_overlay(app, PAGE_SIZE),
        Some(KbAction::PageUp) => move_overlay(app, -PAGE_SIZE),
        Some(KbAction::Select) => app.confirm_overlay(),
        _ => {}
    }
    Action::Continue
}

fn move_overlay(app: &mut App, delta: isize) {
    if let Some(overlay) = app.overlay.as_mut() {
        overlay.move_selection(delta);
    }
}

/// Handle input on the news screen.
fn handle_news_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::News);

    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.move_news_cursor(1),
        Some(KbAction::NavUp) => app.move_news_cursor(-1),
        Some(KbAction::PageDown) => app.move_news_cursor(PAGE_SIZE),
        Some(KbAction::PageUp) => app.move_news_cursor(-PAGE_SIZE),
        Some(KbAction::Select) => app.open_highlighted(),
        Some(KbAction::ShowActions) => app.show_highlighted_actions(),
        Some(KbAction::ToggleFavorite) => app.toggle_highlighted_favorite(),
        Some(KbAction::ToggleSegment) => app.toggle_segment(),
        Some(KbAction::Refresh) => {
            if app.news.is_refreshing() {
                app.set_status("Already refreshing");
            } else {
                app.news.refresh();
            }
        }
        Some(KbAction::NotificationSettings) => app.news.open_settings(),
        Some(KbAction::EditSources) => app.open_source_selection(),
        Some(KbAction::ShowHelp) => app.overlay = Some(Overlay::Help),
        Some(KbAction::Back) => {
            if app.news_screen().segment == Segment::Favorites {
                app.news.switch_segment(Segment::News);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input on the source selection screen.
fn handle_sources_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Sources);

    match action {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.move_source_cursor(1),
        Some(KbAction::NavUp) => app.move_source_cursor(-1),
        Some(KbAction::PageDown) => app.move_source_cursor(PAGE_SIZE),
        Some(KbAction::PageUp) => app.move_source_cursor(-PAGE_SIZE),
        Some(KbAction::ToggleSource) => app.toggle_highlighted_source(),
        Some(KbAction::ConfirmSources) => app.confirm_sources(),
        Some(KbAction::Back) => app.cancel_sources(),
        Some(KbAction::Refresh) => app.sources.refresh(),
        Some(KbAction::FilterCategory) => {
            app.sources.select_category();
            app.sync_source_screen();
        }
        Some(KbAction::FilterLanguage) => {
            app.sources.select_language();
            app.sync_source_screen();
        }
        Some(KbAction::FilterCountry) => {
            app.sources.select_country();
            app.sync_source_screen();
        }
        Some(KbAction::ShowHelp) => app.overlay = Some(Overlay::Help),
        _ => {}
    }
    Action::Continue
}
