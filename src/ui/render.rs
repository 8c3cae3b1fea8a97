//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! screen and drawing the open overlay on top.

use crate::app::{App, FilterKind, Overlay, Screen, SheetAction, SHEET_ACTIONS};
use crate::models::Article;
use crate::news::NotificationSettingsAction;
use crate::util::{clean_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{help, news, sources, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Loading indicator frames, advanced by the tick handler.
pub(super) const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.screen {
        Screen::News => news::render(f, app, chunks[0]),
        Screen::Sources => sources::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);

    match &app.overlay {
        Some(Overlay::Help) => help::render(f, app),
        Some(Overlay::ActionSheet { article, selected }) => {
            render_action_sheet(f, app, article, *selected)
        }
        Some(Overlay::Settings { selected }) => render_settings(f, app, *selected),
        Some(Overlay::Filter { kind, selected }) => render_filter(f, *kind, *selected),
        None => {}
    }
}

/// Current spinner glyph.
pub(super) fn spinner(app: &App) -> char {
    SPINNER[app.spinner_frame % SPINNER.len()]
}

/// Rectangle of at most `width` x `height` centered in `area`.
pub(super) fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Lines of a vertical menu with the selected entry highlighted.
fn menu_lines<'a>(items: impl IntoIterator<Item = String>, selected: usize) -> Vec<Line<'a>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if i == selected {
                Line::from(Span::styled(
                    format!("> {}", item),
                    Style::default().bg(Color::DarkGray).fg(Color::White),
                ))
            } else {
                Line::from(format!("  {}", item))
            }
        })
        .collect()
}

/// Draw a bordered menu box. Lines beyond the box height scroll so the
/// selected entry stays visible.
fn render_menu(f: &mut Frame, title: String, mut lines: Vec<Line<'_>>, selected: usize, hint: &str) {
    let area = f.area();
    // +2 borders, +2 blank line and hint
    let wanted = lines.len() as u16 + 4;
    let overlay = centered(50, wanted, area);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    let visible = overlay.height.saturating_sub(4) as usize;
    let skip = (selected + 1).saturating_sub(visible);
    lines = lines.into_iter().skip(skip).take(visible).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(paragraph, overlay);
}

fn render_action_sheet(f: &mut Frame, app: &App, article: &Article, selected: usize) {
    let favorited = app.news.is_favorited(article);
    let items = SHEET_ACTIONS.iter().map(|action| {
        match action {
            SheetAction::Open => "Open in browser",
            SheetAction::ToggleFavorite if favorited => "Remove from favorites",
            SheetAction::ToggleFavorite => "Add to favorites",
            SheetAction::Cancel => "Cancel",
        }
        .to_string()
    });
    let title = truncate_to_width(&clean_line(&article.title), 44).into_owned();
    render_menu(
        f,
        format!(" {} ", title),
        menu_lines(items, selected),
        selected,
        "(Enter) Select  (Esc) Cancel",
    );
}

fn render_settings(f: &mut Frame, app: &App, selected: usize) {
    let enabled = app.news.notifications_enabled();
    let current = app.news.notification_time();
    let items = NotificationSettingsAction::ALL.iter().map(|action| {
        let active = match action.time() {
            Some(time) => time == current,
            None => (*action == NotificationSettingsAction::Enable) == enabled,
        };
        if active {
            format!("{} *", action.label())
        } else {
            action.label().to_string()
        }
    });
    render_menu(
        f,
        " Favorites digest ".to_string(),
        menu_lines(items, selected),
        selected,
        "(Enter) Apply  (Esc) Close",
    );
}

fn render_filter(f: &mut Frame, kind: FilterKind, selected: usize) {
    let items = kind.options().into_iter().map(str::to_string);
    render_menu(
        f,
        format!(" {} ", kind.title()),
        menu_lines(items, selected),
        selected,
        "(Enter) Apply  (Esc) Cancel",
    );
}

/// Bold section header line.
pub(super) fn header_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}
