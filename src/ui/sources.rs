use crate::app::App;
use crate::sources::source_row;
use crate::util::{clean_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::spinner;

/// Render the source screen: filter bar above the catalogue.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    render_filters(f, app, chunks[0]);

    let screen = app.source_screen();
    if !screen.error_hidden {
        render_message(f, "No sources match these filters.\n\n(r) Retry", chunks[1]);
    } else if screen.table_hidden {
        let text = format!("{} Loading sources...", spinner(app));
        render_message(f, &text, chunks[1]);
    } else {
        render_catalogue(f, app, chunks[1]);
    }
}

fn render_filters(f: &mut Frame, app: &App, area: Rect) {
    let screen = app.source_screen();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan);
    let line = Line::from(vec![
        Span::styled(" [c] ", label),
        Span::styled(screen.category.clone(), value),
        Span::styled("  [l] ", label),
        Span::styled(screen.language.clone(), value),
        Span::styled("  [g] ", label),
        Span::styled(screen.country.clone(), value),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_message(f: &mut Frame, text: &str, area: Rect) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Sources"));
    f.render_widget(paragraph, area);
}

fn render_catalogue(f: &mut Frame, app: &App, area: Rect) {
    let selection = app.sources.selection();
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = app
        .sources
        .sources()
        .iter()
        .map(|source| {
            let row = source_row(source);
            // Position in the fetch order, if selected.
            let order = selection.iter().position(|s| s.id == source.id);
            let marker = match order {
                Some(i) => format!("[{:>2}] ", i + 1),
                None => "[  ] ".to_string(),
            };
            let name_style = if order.is_some() {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            let name =
                truncate_to_width(&clean_line(&row.name), width.saturating_sub(20)).into_owned();
            let description =
                truncate_to_width(&clean_line(&row.description), width.saturating_sub(5)).into_owned();
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(name, name_style),
                    Span::styled(format!("  {}", row.category), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(Span::styled(
                    format!("     {}", description),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let title = format!(
        "Sources ({} selected of {})",
        selection.len(),
        items.len()
    );

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default().with_selected(Some(app.source_screen().cursor));
    f.render_stateful_widget(list, area, &mut state);
}
