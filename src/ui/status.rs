use crate::app::{App, Screen};
use crate::news::Segment;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.activity.is_active() {
        Cow::Owned(format!("Fetching... {} request(s)", app.activity.in_flight()))
    } else {
        match app.screen {
            Screen::News => match app.news_screen().segment {
                Segment::News => Cow::Borrowed(
                    "[o]pen [a]ctions [f]avorite [Tab]segment [r]efresh [s]ources [n]otify [?]help [q]uit",
                ),
                Segment::Favorites => Cow::Borrowed(
                    "[o]pen [a]ctions [f]avorite [Tab]segment [?]help [q]uit",
                ),
            },
            Screen::Sources => {
                if app.source_screen().cancel_visible {
                    Cow::Borrowed("[Space]select [Enter]done [Esc]cancel [c/l/g]filters [?]help")
                } else {
                    Cow::Borrowed("[Space]select [Enter]done [c/l/g]filters [?]help")
                }
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
