//! The news screen: aggregation store, interactor state machine and
//! presenter.
//!
//! # Architecture
//!
//! - [`store`] - articles grouped by source with change tracking
//! - [`interactor`] - the refresh pipeline and favorite handling
//! - [`presenter`] - view instructions and row formatting
//!
//! Collaborators the interactor depends on are the traits in this module.
//! The application wires real implementations (SQLite preferences, the HTTP
//! loader, the terminal view); tests wire recording mocks.

mod interactor;
mod presenter;
mod store;

pub use interactor::{NewsDependencies, NewsInteractor};
pub use presenter::{article_row, format_published, ArticleRow, NewsPresenter, NewsView};
pub use store::{NewsStore, NewsStoreChange};

use crate::models::{Article, SelectedSource};

/// Lifecycle of one refresh cycle as shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsState {
    Loading,
    News,
    Error,
}

/// Which list the news screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    News,
    Favorites,
}

/// Reads and stores the user's source selection.
pub trait SourceHolder {
    /// Selected sources in fetch order; `None` if nothing was ever chosen.
    fn selected_sources(&self) -> Option<Vec<SelectedSource>>;
    fn save(&mut self, sources: &[SelectedSource]);
}

/// Persisted favorites, most recently added first.
pub trait FavoriteCache {
    fn favorites(&self) -> Vec<Article>;
    /// No-op when the article is already a favorite.
    fn save(&mut self, article: &Article);
    /// No-op when the article is not a favorite.
    fn delete(&mut self, article: &Article);
}

/// Local notification scheduling. Fire-and-forget; failures are logged by
/// the implementation.
pub trait NotificationScheduler {
    fn add_notification(&mut self, article: &Article);
    fn remove_notification(&mut self, article: &Article);
    fn remove_all(&mut self);
    fn update_schedule(&mut self);
}

pub trait NotificationSettings {
    fn notifications_enabled(&self) -> bool;
    fn set_notifications_enabled(&mut self, enabled: bool);
    /// Delivery time as `(hour, minute)`.
    fn time(&self) -> (u32, u32);
    fn update_time(&mut self, hour: u32, minute: u32);
}

/// Navigation away from the news list.
pub trait NewsRouter {
    fn open_source_selection(&mut self);
    fn open_article(&mut self, url: &str);
    fn open_action_sheet(&mut self, article: &Article);
    fn open_settings(&mut self);
}

/// Entries of the notification settings menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSettingsAction {
    Am10,
    Pm3,
    Pm6,
    Pm7,
    Pm8,
    Pm9,
    Pm10,
    Disable,
    Enable,
}

impl NotificationSettingsAction {
    /// Menu order.
    pub const ALL: &'static [NotificationSettingsAction] = &[
        Self::Am10,
        Self::Pm3,
        Self::Pm6,
        Self::Pm7,
        Self::Pm8,
        Self::Pm9,
        Self::Pm10,
        Self::Disable,
        Self::Enable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Am10 => "10 AM",
            Self::Pm3 => "3 PM",
            Self::Pm6 => "6 PM",
            Self::Pm7 => "7 PM",
            Self::Pm8 => "8 PM",
            Self::Pm9 => "9 PM",
            Self::Pm10 => "10 PM",
            Self::Disable => "Disable",
            Self::Enable => "Enable",
        }
    }

    /// `(hour, minute)` for time entries, `None` for the toggles.
    pub fn time(self) -> Option<(u32, u32)> {
        match self {
            Self::Am10 => Some((10, 0)),
            Self::Pm3 => Some((15, 0)),
            Self::Pm6 => Some((18, 0)),
            Self::Pm7 => Some((19, 0)),
            Self::Pm8 => Some((20, 0)),
            Self::Pm9 => Some((21, 0)),
            Self::Pm10 => Some((22, 0)),
            Self::Disable | Self::Enable => None,
        }
    }
}
