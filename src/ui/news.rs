use crate::app::App;
use crate::news::{article_row, Segment};
use crate::util::{clean_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::{header_line, spinner};

const ERROR_TEXT: &str =
    "No news could be loaded.\n\n(r) Retry  (s) Choose sources";

/// Render the news screen: segment tabs above the headline list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    render_tabs(f, app, chunks[0]);

    let screen = app.news_screen();
    match screen.segment {
        Segment::Favorites => render_favorites(f, app, chunks[1]),
        Segment::News if !screen.error_hidden => render_message(f, ERROR_TEXT, chunks[1]),
        Segment::News if screen.table_hidden && screen.loading => {
            let text = format!("{} Loading news...", spinner(app));
            render_message(f, &text, chunks[1]);
        }
        Segment::News => render_sections(f, app, chunks[1]),
    }
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let screen = app.news_screen();
    let tab = |label: &'static str, segment: Segment| {
        if screen.segment == segment {
            Span::styled(
                format!(" {} ", label),
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!(" {} ", label))
        }
    };

    let mut spans = vec![tab("News", Segment::News)];
    if screen.favorites_segment_visible {
        spans.push(Span::raw(" "));
        spans.push(tab("Favorites", Segment::Favorites));
    }
    if screen.loading && !screen.table_hidden {
        spans.push(Span::styled(
            format!("  {}", spinner(app)),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_message(f: &mut Frame, text: &str, area: Rect) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Headlines"));
    f.render_widget(paragraph, area);
}

/// Two lines per article: the title, then date and author.
fn article_item<'a>(title: &str, date: &str, author: &str, width: u16) -> ListItem<'a> {
    let width = width.saturating_sub(4) as usize;
    let title = truncate_to_width(&clean_line(title), width).into_owned();
    let meta = if author.is_empty() {
        date.to_string()
    } else {
        format!("{}  {}", date, clean_line(author))
    };
    let meta = truncate_to_width(&meta, width).into_owned();
    ListItem::new(vec![
        Line::from(Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(meta, Style::default().fg(Color::Gray))),
    ])
}

fn render_sections(f: &mut Frame, app: &App, area: Rect) {
    let store = app.news.store();
    let cursor = app.news_screen().cursor;
    let favorites = app.news.favorites();
    let mut items = Vec::with_capacity(store.count() + store.section_count());
    let mut selected = None;

    for section in 0..store.section_count() {
        items.push(ListItem::new(header_line(&clean_line(store.source(section)))));
        for index in 0..store.count_in(section) {
            let article = store.article(index, section);
            let row = article_row(article);
            let favorite = favorites.contains(article);
            if cursor.section == section && cursor.row == index {
                selected = Some(items.len());
            }
            let mut item = article_item(&row.title, &row.date, &row.author, area.width);
            if favorite {
                item = item.style(Style::default().fg(Color::Yellow));
            }
            items.push(item);
        }
    }

    if items.is_empty() {
        render_message(f, "No headlines yet", area);
        return;
    }

    let title = format!("Headlines ({})", store.count());
    render_list(f, items, selected, title, area);
}

fn render_favorites(f: &mut Frame, app: &App, area: Rect) {
    let favorites = app.news.favorites();
    if favorites.is_empty() {
        render_message(f, "No favorites", area);
        return;
    }

    let items: Vec<ListItem> = favorites
        .iter()
        .map(|article| {
            let row = article_row(article);
            article_item(&row.title, &row.date, &row.author, area.width)
        })
        .collect();
    let selected = Some(app.news_screen().favorites_cursor.min(items.len() - 1));
    let title = format!("Favorites ({})", favorites.len());
    render_list(f, items, selected, title, area);
}

fn render_list(f: &mut Frame, items: Vec<ListItem>, selected: Option<usize>, title: String, area: Rect) {
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);
}
