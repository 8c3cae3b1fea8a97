use crate::api::{ApiEndpoint, Loaded, NetworkActivityListener, NewsLoader, SourceLoader};
use crate::keybindings::KeybindingRegistry;
use crate::models::{Article, Country, Language, Source, SourceCategory};
use crate::news::{
    NewsDependencies, NewsInteractor, NewsRouter, NewsView, NotificationSettingsAction, Segment,
};
use crate::notify::{DigestCenter, LocalNotificationController};
use crate::sources::{NewsRefresher, SourceDependencies, SourceInteractor, SourceView};
use crate::storage::{
    FavoriteNewsCache, PreferenceStore, SelectedSourceHolder, SettingsHolder,
    StoredSourceParameters,
};
use crate::util::validate_url_for_open;
use anyhow::{Context, Result};
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// How long a status bar message stays up.
const STATUS_TTL: Duration = Duration::from_secs(4);

/// Number of frames in the loading spinner animation.
pub const SPINNER_FRAMES: usize = 10;

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy with loop detection and a hop limit.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 5 {
            return attempt.error("Too many redirects (max 5)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Shared HTTP client for the news and source loaders.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout)
        .redirect(create_redirect_policy())
        .build()
        .context("Failed to build HTTP client")
}

// ============================================================================
// Routing
// ============================================================================

/// Navigation requests raised by the interactors, handled on the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    OpenSourceSelection,
    OpenArticle(String),
    OpenActionSheet(Article),
    OpenSettings,
    RefreshNews,
}

/// Router handed to the interactors. Requests are queued, never handled
/// re-entrantly.
#[derive(Clone)]
pub struct AppRouter {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl AppRouter {
    pub fn new(tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: AppEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(event = ?e.0, "Dropping app event (receiver closed)");
        }
    }
}

impl NewsRouter for AppRouter {
    fn open_source_selection(&mut self) {
        self.send(AppEvent::OpenSourceSelection);
    }

    fn open_article(&mut self, url: &str) {
        self.send(AppEvent::OpenArticle(url.to_string()));
    }

    fn open_action_sheet(&mut self, article: &Article) {
        self.send(AppEvent::OpenActionSheet(article.clone()));
    }

    fn open_settings(&mut self) {
        self.send(AppEvent::OpenSettings);
    }
}

impl NewsRefresher for AppRouter {
    fn refresh_news(&mut self) {
        self.send(AppEvent::RefreshNews);
    }
}

// ============================================================================
// Screens and Overlays
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    News,
    Sources,
}

/// Which catalogue filter a selector edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Category,
    Language,
    Country,
}

impl FilterKind {
    pub fn title(self) -> &'static str {
        match self {
            FilterKind::Category => "Select category",
            FilterKind::Language => "Select language",
            FilterKind::Country => "Select country",
        }
    }

    /// Selector entries: the "all" entry first, then every value.
    pub fn options(self) -> Vec<&'static str> {
        let (all, values): (&str, Vec<&'static str>) = match self {
            FilterKind::Category => (
                "All categories",
                SourceCategory::ALL.iter().map(|c| c.title()).collect(),
            ),
            FilterKind::Language => (
                "All languages",
                Language::ALL.iter().map(|l| l.title()).collect(),
            ),
            FilterKind::Country => (
                "All countries",
                Country::ALL.iter().map(|c| c.title()).collect(),
            ),
        };
        std::iter::once(all).chain(values).collect()
    }
}

/// Entries of the article action sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetAction {
    Open,
    ToggleFavorite,
    Cancel,
}

pub const SHEET_ACTIONS: [SheetAction; 3] = [
    SheetAction::Open,
    SheetAction::ToggleFavorite,
    SheetAction::Cancel,
];

/// Modal drawn over the current screen; it receives all input.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    ActionSheet { article: Article, selected: usize },
    Settings { selected: usize },
    Filter { kind: FilterKind, selected: usize },
    Help,
}

impl Overlay {
    /// Number of selectable entries.
    pub fn len(&self) -> usize {
        match self {
            Overlay::ActionSheet { .. } => SHEET_ACTIONS.len(),
            Overlay::Settings { .. } => NotificationSettingsAction::ALL.len(),
            Overlay::Filter { kind, .. } => kind.options().len(),
            Overlay::Help => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.len();
        if let Overlay::ActionSheet { selected, .. }
        | Overlay::Settings { selected }
        | Overlay::Filter { selected, .. } = self
        {
            *selected = step_index(*selected, delta, len);
        }
    }
}

/// Position of the highlighted news row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCursor {
    pub section: usize,
    pub row: usize,
}

/// Move `cursor` by `delta` rows across sections, clamped to the first and
/// last row. `lengths` are the row counts of each section.
pub fn step_cursor(lengths: &[usize], cursor: RowCursor, delta: isize) -> RowCursor {
    let total: usize = lengths.iter().sum();
    if total == 0 {
        return RowCursor::default();
    }
    let flat: usize = lengths.iter().take(cursor.section).sum::<usize>() + cursor.row;
    let mut target = step_index(flat, delta, total);
    for (section, &len) in lengths.iter().enumerate() {
        if target < len {
            return RowCursor {
                section,
                row: target,
            };
        }
        target -= len;
    }
    RowCursor::default()
}

fn step_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

/// Announced incremental table change, surfaced in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableUpdate {
    Section { rows: usize, section: usize },
    Rows { rows: usize, section: usize },
}

/// Terminal state of the news screen, driven by the news presenter.
#[derive(Debug)]
pub struct NewsScreen {
    pub table_hidden: bool,
    pub error_hidden: bool,
    pub loading: bool,
    pub segment: Segment,
    pub favorites_segment_visible: bool,
    pub cursor: RowCursor,
    pub favorites_cursor: usize,
    pub last_update: Option<TableUpdate>,
}

impl Default for NewsScreen {
    fn default() -> Self {
        Self {
            table_hidden: false,
            error_hidden: true,
            loading: false,
            segment: Segment::News,
            favorites_segment_visible: false,
            cursor: RowCursor::default(),
            favorites_cursor: 0,
            last_update: None,
        }
    }
}

impl NewsView for NewsScreen {
    fn reload_table(&mut self) {
        self.last_update = None;
    }

    fn reset_scroll(&mut self) {
        self.cursor = RowCursor::default();
    }

    fn set_table_hidden(&mut self, hidden: bool) {
        self.table_hidden = hidden;
    }

    fn set_error_hidden(&mut self, hidden: bool) {
        self.error_hidden = hidden;
    }

    fn animate_loading(&mut self) {
        self.loading = true;
    }

    fn remove_loading_animation(&mut self) {
        self.loading = false;
    }

    fn insert_section(&mut self, rows: usize, section: usize) {
        self.last_update = Some(TableUpdate::Section { rows, section });
    }

    fn add_rows(&mut self, rows: usize, section: usize) {
        self.last_update = Some(TableUpdate::Rows { rows, section });
    }

    fn set_favorites_segment_visible(&mut self, visible: bool) {
        self.favorites_segment_visible = visible;
    }

    fn show_segment(&mut self, segment: Segment) {
        self.segment = segment;
    }

    fn reload_favorites(&mut self) {
        self.favorites_cursor = 0;
    }
}

/// Terminal state of the source screen, driven by the source presenter.
#[derive(Debug)]
pub struct SourceScreen {
    pub table_hidden: bool,
    pub error_hidden: bool,
    pub loading: bool,
    pub category: String,
    pub language: String,
    pub country: String,
    pub cancel_visible: bool,
    pub cursor: usize,
    /// Set by `close`; consumed by the app to return to the news screen.
    pub closed: bool,
    /// Set by the selector requests; consumed by the app to open an overlay.
    pub selector: Option<FilterKind>,
}

impl Default for SourceScreen {
    fn default() -> Self {
        Self {
            table_hidden: true,
            error_hidden: true,
            loading: false,
            category: String::new(),
            language: String::new(),
            country: String::new(),
            cancel_visible: false,
            cursor: 0,
            closed: false,
            selector: None,
        }
    }
}

impl SourceView for SourceScreen {
    fn reload_table(&mut self) {}

    fn reset_scroll(&mut self) {
        self.cursor = 0;
    }

    fn set_table_hidden(&mut self, hidden: bool) {
        self.table_hidden = hidden;
    }

    fn set_error_hidden(&mut self, hidden: bool) {
        self.error_hidden = hidden;
    }

    fn animate_loading(&mut self) {
        self.loading = true;
    }

    fn remove_loading_animation(&mut self) {
        self.loading = false;
    }

    fn display_category(&mut self, title: &str) {
        self.category = title.to_string();
    }

    fn display_language(&mut self, title: &str) {
        self.language = title.to_string();
    }

    fn display_country(&mut self, title: &str) {
        self.country = title.to_string();
    }

    fn open_category_selector(&mut self, _categories: &[SourceCategory]) {
        self.selector = Some(FilterKind::Category);
    }

    fn open_language_selector(&mut self, _languages: &[Language]) {
        self.selector = Some(FilterKind::Language);
    }

    fn open_country_selector(&mut self, _countries: &[Country]) {
        self.selector = Some(FilterKind::Country);
    }

    fn show_cancel(&mut self) {
        self.cancel_visible = true;
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Everything [`App::new`] needs from the outside world.
pub struct AppContext {
    pub client: reqwest::Client,
    pub endpoint: Arc<ApiEndpoint>,
    pub prefs: PreferenceStore,
    pub notifications_authorized: bool,
    pub keybindings: KeybindingRegistry,
}

/// Receivers the UI loop drains.
pub struct AppChannels {
    pub articles: mpsc::UnboundedReceiver<Loaded<Article>>,
    pub sources: mpsc::UnboundedReceiver<Loaded<Source>>,
    pub events: mpsc::UnboundedReceiver<AppEvent>,
}

pub struct App {
    pub news: NewsInteractor<NewsScreen>,
    pub sources: SourceInteractor<SourceScreen>,
    pub screen: Screen,
    pub overlay: Option<Overlay>,
    pub activity: Arc<NetworkActivityListener>,
    pub digest: DigestCenter,
    pub prefs: PreferenceStore,
    pub keybindings: KeybindingRegistry,
    pub help_scroll_offset: usize,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    /// Wire loaders, persisted collaborators and interactors.
    pub fn new(ctx: AppContext) -> (Self, AppChannels) {
        let (article_tx, articles) = mpsc::unbounded_channel();
        let (source_tx, sources) = mpsc::unbounded_channel();
        let (event_tx, events) = mpsc::unbounded_channel();

        let activity = Arc::new(NetworkActivityListener::new());
        let router = AppRouter::new(event_tx);
        let digest = DigestCenter::new(ctx.prefs.clone(), ctx.notifications_authorized);

        let news_deps = NewsDependencies {
            loader: Box::new(NewsLoader::new(
                ctx.client.clone(),
                ctx.endpoint.clone(),
                activity.clone(),
                article_tx,
            )),
            source_holder: Box::new(SelectedSourceHolder::new(ctx.prefs.clone())),
            favorites: Box::new(FavoriteNewsCache::new(ctx.prefs.clone())),
            scheduler: Box::new(LocalNotificationController::new(
                digest.clone(),
                SettingsHolder::new(ctx.prefs.clone()),
            )),
            settings: Box::new(SettingsHolder::new(ctx.prefs.clone())),
            router: Box::new(router.clone()),
        };

        let source_deps = SourceDependencies {
            loader: Box::new(SourceLoader::new(
                ctx.client,
                ctx.endpoint,
                activity.clone(),
                source_tx,
            )),
            source_holder: Box::new(SelectedSourceHolder::new(ctx.prefs.clone())),
            parameters: Box::new(StoredSourceParameters::new(ctx.prefs.clone())),
            refresher: Box::new(router),
        };

        let app = Self {
            news: NewsInteractor::new(news_deps, NewsScreen::default()),
            sources: SourceInteractor::new(source_deps, SourceScreen::default()),
            screen: Screen::News,
            overlay: None,
            activity,
            digest,
            prefs: ctx.prefs,
            keybindings: ctx.keybindings,
            help_scroll_offset: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        };
        let channels = AppChannels {
            articles,
            sources,
            events,
        };
        (app, channels)
    }

    /// First frame: restore the favorites segment and start fetching.
    pub fn start(&mut self) {
        self.news.load_favorites_segment();
        self.news.view_did_appear();
    }

    /// Wait for pending preference writes before exit.
    pub async fn shutdown(&self) {
        self.prefs.flush().await;
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn news_screen(&self) -> &NewsScreen {
        self.news.presenter().view()
    }

    pub fn news_screen_mut(&mut self) -> &mut NewsScreen {
        self.news.presenter_mut().view_mut()
    }

    pub fn source_screen(&self) -> &SourceScreen {
        self.sources.presenter().view()
    }

    pub fn source_screen_mut(&mut self) -> &mut SourceScreen {
        self.sources.presenter_mut().view_mut()
    }

    /// Whether the visible screen shows its spinner.
    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::News => self.news_screen().loading,
            Screen::Sources => self.source_screen().loading,
        }
    }

    // ------------------------------------------------------------------------
    // News screen
    // ------------------------------------------------------------------------

    fn section_lengths(&self) -> Vec<usize> {
        let store = self.news.store();
        (0..store.section_count()).map(|s| store.count_in(s)).collect()
    }

    pub fn move_news_cursor(&mut self, delta: isize) {
        match self.news_screen().segment {
            Segment::News => {
                let lengths = self.section_lengths();
                let screen = self.news_screen_mut();
                screen.cursor = step_cursor(&lengths, screen.cursor, delta);
            }
            Segment::Favorites => {
                let len = self.news.favorites().len();
                let screen = self.news_screen_mut();
                screen.favorites_cursor = step_index(screen.favorites_cursor, delta, len);
            }
        }
    }

    /// `(index, section)` of the highlighted row, if the list has one.
    pub fn highlighted(&self) -> Option<(usize, usize)> {
        let screen = self.news_screen();
        match screen.segment {
            Segment::News => {
                if screen.table_hidden {
                    return None;
                }
                let store = self.news.store();
                let cursor = screen.cursor;
                (cursor.section < store.section_count()
                    && cursor.row < store.count_in(cursor.section))
                .then_some((cursor.row, cursor.section))
            }
            Segment::Favorites => {
                (screen.favorites_cursor < self.news.favorites().len())
                    .then_some((screen.favorites_cursor, 0))
            }
        }
    }

    pub fn open_highlighted(&mut self) {
        if let Some((index, section)) = self.highlighted() {
            self.news.select(index, section);
        }
    }

    pub fn show_highlighted_actions(&mut self) {
        if let Some((index, section)) = self.highlighted() {
            self.news.show_actions(index, section);
        }
    }

    pub fn toggle_highlighted_favorite(&mut self) {
        if let Some((index, section)) = self.highlighted() {
            let article = self.news.article_at(index, section);
            self.toggle_favorite(&article);
        }
    }

    fn toggle_favorite(&mut self, article: &Article) {
        let was_favorite = self.news.is_favorited(article);
        self.news.favorite(article);
        if was_favorite {
            self.set_status("Removed from favorites");
        } else {
            self.set_status("Added to favorites");
        }
        // The favorites list may have shrunk under the cursor.
        self.move_news_cursor(0);
    }

    pub fn toggle_segment(&mut self) {
        let next = match self.news_screen().segment {
            Segment::News => Segment::Favorites,
            Segment::Favorites => Segment::News,
        };
        self.news.switch_segment(next);
        if next == Segment::Favorites && self.news_screen().segment != Segment::Favorites {
            self.set_status("No favorites yet");
        }
    }

    /// Report an incremental table update announced by the presenter.
    pub fn announce_table_update(&mut self) {
        let Some(update) = self.news_screen_mut().last_update.take() else {
            return;
        };
        let (rows, section) = match update {
            TableUpdate::Section { rows, section } | TableUpdate::Rows { rows, section } => {
                (rows, section)
            }
        };
        let source = self.news.store().source(section).to_string();
        self.set_status(format!("+{rows} from {source}"));
    }

    pub fn open_article(&mut self, url: &str) {
        match validate_url_for_open(url) {
            Ok(url) => {
                if let Err(e) = open::that(url.as_str()) {
                    tracing::warn!(error = %e, "Failed to launch browser");
                    self.set_status(format!("Failed to open browser: {}", e));
                } else {
                    self.set_status("Opened in browser");
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Refusing to open article URL");
                self.set_status(format!("Cannot open link: {}", e));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Source screen
    // ------------------------------------------------------------------------

    pub fn open_source_selection(&mut self) {
        if self.screen == Screen::Sources {
            return;
        }
        self.screen = Screen::Sources;
        self.overlay = None;
        self.sources.on_did_load();
        self.sync_source_screen();
    }

    pub fn move_source_cursor(&mut self, delta: isize) {
        let len = self.sources.sources().len();
        let screen = self.source_screen_mut();
        screen.cursor = step_index(screen.cursor, delta, len);
    }

    pub fn toggle_highlighted_source(&mut self) {
        let cursor = self.source_screen().cursor;
        if !self.source_screen().table_hidden && cursor < self.sources.sources().len() {
            self.sources.toggle_source(cursor);
        }
    }

    pub fn confirm_sources(&mut self) {
        if self.sources.selection().is_empty() {
            self.set_status("Select at least one source");
            return;
        }
        self.sources.confirm();
        self.sync_source_screen();
    }

    pub fn cancel_sources(&mut self) {
        if !self.source_screen().cancel_visible {
            self.set_status("Select at least one source");
            return;
        }
        self.sources.cancel();
        self.sync_source_screen();
    }

    /// Apply the one-shot requests the source presenter left on its view.
    pub fn sync_source_screen(&mut self) {
        let screen = self.source_screen_mut();
        let closed = std::mem::take(&mut screen.closed);
        let selector = screen.selector.take();

        if closed {
            self.screen = Screen::News;
            self.overlay = None;
        } else if let Some(kind) = selector {
            self.overlay = Some(Overlay::Filter { kind, selected: 0 });
        }
    }

    // ------------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------------

    /// Run the highlighted overlay entry and close the overlay.
    pub fn confirm_overlay(&mut self) {
        let Some(overlay) = self.overlay.take() else {
            return;
        };
        match overlay {
            Overlay::ActionSheet { article, selected } => match SHEET_ACTIONS.get(selected) {
                Some(SheetAction::Open) => self.open_article(&article.url),
                Some(SheetAction::ToggleFavorite) => self.toggle_favorite(&article),
                Some(SheetAction::Cancel) | None => {}
            },
            Overlay::Settings { selected } => {
                if let Some(&action) = NotificationSettingsAction::ALL.get(selected) {
                    self.news.apply_notification_setting(action);
                    self.set_status(settings_status(action));
                }
            }
            Overlay::Filter { kind, selected } => {
                self.apply_filter(kind, selected);
                self.sync_source_screen();
            }
            Overlay::Help => {}
        }
    }

    fn apply_filter(&mut self, kind: FilterKind, selected: usize) {
        // Entry 0 is "all"; the rest follow the value lists.
        let index = selected.checked_sub(1);
        match kind {
            FilterKind::Category => {
                let value = index.and_then(|i| SourceCategory::ALL.get(i).copied());
                self.sources.category_selected(value);
            }
            FilterKind::Language => {
                let value = index.and_then(|i| Language::ALL.get(i).copied());
                self.sources.language_selected(value);
            }
            FilterKind::Country => {
                let value = index.and_then(|i| Country::ALL.get(i).copied());
                self.sources.country_selected(value);
            }
        }
    }
}

fn settings_status(action: NotificationSettingsAction) -> String {
    match action {
        NotificationSettingsAction::Disable => "Digest notifications disabled".to_string(),
        NotificationSettingsAction::Enable => "Digest notifications enabled".to_string(),
        time => format!("Digest scheduled for {}", time.label()),
    }
}
