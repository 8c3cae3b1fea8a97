use chrono::{Local, NaiveDateTime};

use super::store::{NewsStore, NewsStoreChange};
use super::{NewsState, Segment};
use crate::models::{Article, PUBLISHED_AT_FORMAT};

/// Display pattern for article dates: `20 May 2017  6:00 PM`.
const DISPLAY_DATE_FORMAT: &str = "%-d %b %Y  %-I:%M %p";

/// Instructions the news screen understands.
///
/// Rendering is entirely up to the implementation; the presenter only decides
/// which instructions to issue and in what order.
pub trait NewsView {
    fn reload_table(&mut self);
    fn reset_scroll(&mut self);
    fn set_table_hidden(&mut self, hidden: bool);
    fn set_error_hidden(&mut self, hidden: bool);
    fn animate_loading(&mut self);
    fn remove_loading_animation(&mut self);
    /// Insert a new section holding `rows` rows at index `section`.
    fn insert_section(&mut self, rows: usize, section: usize);
    /// Append `rows` rows at the end of an existing `section`.
    fn add_rows(&mut self, rows: usize, section: usize);
    fn set_favorites_segment_visible(&mut self, visible: bool);
    fn show_segment(&mut self, segment: Segment);
    fn reload_favorites(&mut self);
}

/// Everything a news row shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRow {
    pub title: String,
    pub date: String,
    pub description: String,
    pub author: String,
    pub image_url: String,
    pub source_url: String,
}

/// Turns store state and store changes into [`NewsView`] instructions.
///
/// Holds no article data; the only state is which segment is on screen.
pub struct NewsPresenter<V> {
    view: V,
    segment: Segment,
    favorites_visible: bool,
}

impl<V: NewsView> NewsPresenter<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            segment: Segment::News,
            favorites_visible: false,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn favorites_visible(&self) -> bool {
        self.favorites_visible
    }

    pub fn present(&mut self, state: NewsState) {
        match state {
            NewsState::Loading => {
                self.reload_table();
                self.view.set_table_hidden(true);
                self.view.set_error_hidden(true);
                self.view.animate_loading();
            }
            NewsState::News => {
                self.reload_table();
                self.view.set_table_hidden(false);
                self.view.set_error_hidden(true);
                self.view.remove_loading_animation();
            }
            NewsState::Error => {
                self.view.set_error_hidden(false);
                self.view.set_table_hidden(true);
                self.view.remove_loading_animation();
            }
        }
    }

    /// Incremental update after a store merge.
    ///
    /// `Reload` is never routed here (it goes through `present(News)`) and
    /// is ignored.
    pub fn add_articles(&mut self, change: NewsStoreChange, store: &NewsStore) {
        match change {
            NewsStoreChange::NewSource(rows) => {
                let last_section = store.section_count().saturating_sub(1);
                self.view.insert_section(rows, last_section);
            }
            NewsStoreChange::AddNewsToSource(section, rows) => {
                self.view.add_rows(rows, section);
            }
            NewsStoreChange::Reload => {}
        }
    }

    /// Show or hide the favorites segment. Hiding it while it is on screen
    /// falls back to the news segment.
    pub fn present_favorites_segment(&mut self, visible: bool) {
        self.favorites_visible = visible;
        self.view.set_favorites_segment_visible(visible);
        if !visible && self.segment == Segment::Favorites {
            self.show_segment(Segment::News);
        }
    }

    pub fn show_segment(&mut self, segment: Segment) {
        self.segment = segment;
        self.view.show_segment(segment);
    }

    pub fn reload_favorites(&mut self) {
        self.view.reload_favorites();
    }

    fn reload_table(&mut self) {
        self.view.reload_table();
        self.view.reset_scroll();
    }
}

/// Row contents for one article.
pub fn article_row(article: &Article) -> ArticleRow {
    ArticleRow {
        title: article.title.clone(),
        date: format_published(&article.published_at),
        description: article.description.clone(),
        author: article.author.clone(),
        image_url: article.image_url.clone(),
        source_url: article.url.clone(),
    }
}

/// Reformat an API timestamp for display.
///
/// The wall-clock time is kept as published. Unparseable input shows the
/// current time instead.
pub fn format_published(published_at: &str) -> String {
    let date = NaiveDateTime::parse_from_str(published_at, PUBLISHED_AT_FORMAT)
        .unwrap_or_else(|_| Local::now().naive_local());
    localize_meridiem(&date.format(DISPLAY_DATE_FORMAT).to_string())
}

fn localize_meridiem(text: &str) -> String {
    text.replace("PM", "p.m.").replace("AM", "a.m.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingView {
        calls: Vec<String>,
    }

    impl NewsView for RecordingView {
        fn reload_table(&mut self) {
            self.calls.push("reload_table".into());
        }
        fn reset_scroll(&mut self) {
            self.calls.push("reset_scroll".into());
        }
        fn set_table_hidden(&mut self, hidden: bool) {
            self.calls.push(format!("table_hidden({hidden})"));
        }
        fn set_error_hidden(&mut self, hidden: bool) {
            self.calls.push(format!("error_hidden({hidden})"));
        }
        fn animate_loading(&mut self) {
            self.calls.push("animate_loading".into());
        }
        fn remove_loading_animation(&mut self) {
            self.calls.push("remove_loading_animation".into());
        }
        fn insert_section(&mut self, rows: usize, section: usize) {
            self.calls.push(format!("insert_section({rows}, {section})"));
        }
        fn add_rows(&mut self, rows: usize, section: usize) {
            self.calls.push(format!("add_rows({rows}, {section})"));
        }
        fn set_favorites_segment_visible(&mut self, visible: bool) {
            self.calls.push(format!("favorites_visible({visible})"));
        }
        fn show_segment(&mut self, segment: Segment) {
            self.calls.push(format!("show_segment({segment:?})"));
        }
        fn reload_favorites(&mut self) {
            self.calls.push("reload_favorites".into());
        }
    }

    fn presenter() -> NewsPresenter<RecordingView> {
        NewsPresenter::new(RecordingView::default())
    }

    fn article(title: &str) -> Article {
        Article {
            author: "author".into(),
            title: title.into(),
            description: "desc".into(),
            url: format!("https://example.com/{title}"),
            image_url: "https://example.com/img.png".into(),
            published_at: "2017-05-20T18:00:56Z".into(),
        }
    }

    #[test]
    fn test_present_loading() {
        let mut p = presenter();
        p.present(NewsState::Loading);
        assert_eq!(
            p.view().calls,
            vec![
                "reload_table",
                "reset_scroll",
                "table_hidden(true)",
                "error_hidden(true)",
                "animate_loading"
            ]
        );
    }

    #[test]
    fn test_present_news() {
        let mut p = presenter();
        p.present(NewsState::News);
        assert_eq!(
            p.view().calls,
            vec![
                "reload_table",
                "reset_scroll",
                "table_hidden(false)",
                "error_hidden(true)",
                "remove_loading_animation"
            ]
        );
    }

    #[test]
    fn test_present_error() {
        let mut p = presenter();
        p.present(NewsState::Error);
        assert_eq!(
            p.view().calls,
            vec![
                "error_hidden(false)",
                "table_hidden(true)",
                "remove_loading_animation"
            ]
        );
    }

    #[test]
    fn test_new_source_inserts_last_section() {
        let mut store = NewsStore::new();
        store.add(vec![article("a")], "one");
        store.add(vec![article("b"), article("c")], "two");

        let mut p = presenter();
        p.add_articles(store.last_change(), &store);
        assert_eq!(p.view().calls, vec!["insert_section(2, 1)"]);
    }

    #[test]
    fn test_add_to_source_appends_rows() {
        let mut store = NewsStore::new();
        let mut p = presenter();
        p.add_articles(NewsStoreChange::AddNewsToSource(3, 4), &store);
        store.add(vec![article("a")], "one");
        p.add_articles(NewsStoreChange::Reload, &store);
        assert_eq!(p.view().calls, vec!["add_rows(4, 3)"]);
    }

    #[test]
    fn test_hiding_favorites_falls_back_to_news() {
        let mut p = presenter();
        p.present_favorites_segment(true);
        p.show_segment(Segment::Favorites);
        p.present_favorites_segment(false);
        assert_eq!(p.segment(), Segment::News);
        assert_eq!(
            p.view().calls,
            vec![
                "favorites_visible(true)",
                "show_segment(Favorites)",
                "favorites_visible(false)",
                "show_segment(News)"
            ]
        );
    }

    #[test]
    fn test_format_published_pm() {
        assert_eq!(format_published("2017-05-20T18:00:56Z"), "20 May 2017  6:00 p.m.");
    }

    #[test]
    fn test_format_published_am() {
        assert_eq!(format_published("2017-05-07T09:05:00Z"), "7 May 2017  9:05 a.m.");
        assert_eq!(format_published("2017-12-31T00:30:00Z"), "31 Dec 2017  12:30 a.m.");
    }

    #[test]
    fn test_format_published_invalid_falls_back_to_now() {
        let formatted = format_published("yesterday");
        assert!(formatted.ends_with("a.m.") || formatted.ends_with("p.m."));
        let year = Local::now().format("%Y").to_string();
        assert!(formatted.contains(&year));
    }

    #[test]
    fn test_format_published_rejects_other_layouts() {
        // Offsets and fractional seconds are not the API layout.
        let formatted = format_published("2001-01-01T10:00:00+02:00");
        assert!(!formatted.starts_with("1 Jan 2001"));
    }

    #[test]
    fn test_article_row() {
        let row = article_row(&article("headline"));
        assert_eq!(row.title, "headline");
        assert_eq!(row.date, "20 May 2017  6:00 p.m.");
        assert_eq!(row.source_url, "https://example.com/headline");
        assert_eq!(row.image_url, "https://example.com/img.png");
    }
}
