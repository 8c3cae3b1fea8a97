//! Preference-backed implementations of the collaborator traits.

use super::store::PreferenceStore;
use crate::models::{Article, Country, Language, SelectedSource, SourceCategory};
use crate::news::{FavoriteCache, NotificationSettings, SourceHolder};
use crate::sources::SourceParameterHolder;

pub mod keys {
    pub const SELECTED_SOURCES: &str = "news.selected_sources";
    pub const FAVORITES: &str = "news.favorites";
    pub const NOTIFICATIONS_ENABLED: &str = "notifications.enabled";
    pub const NOTIFICATIONS_HOUR: &str = "notifications.hour";
    pub const NOTIFICATIONS_MINUTE: &str = "notifications.minute";
    pub const NOTIFICATIONS_PENDING: &str = "notifications.pending";
    pub const SOURCES_CATEGORY: &str = "sources.category";
    pub const SOURCES_LANGUAGE: &str = "sources.language";
    pub const SOURCES_COUNTRY: &str = "sources.country";
}

pub const DEFAULT_NOTIFICATION_HOUR: u32 = 19;
pub const DEFAULT_NOTIFICATION_MINUTE: u32 = 0;

/// The user's source selection, in fetch order.
#[derive(Clone)]
pub struct SelectedSourceHolder {
    prefs: PreferenceStore,
}

impl SelectedSourceHolder {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self { prefs }
    }
}

impl SourceHolder for SelectedSourceHolder {
    fn selected_sources(&self) -> Option<Vec<SelectedSource>> {
        self.prefs.get(keys::SELECTED_SOURCES)
    }

    fn save(&mut self, sources: &[SelectedSource]) {
        self.prefs.set(keys::SELECTED_SOURCES, sources);
    }
}

/// Favorite articles, most recently added first.
#[derive(Clone)]
pub struct FavoriteNewsCache {
    prefs: PreferenceStore,
}

impl FavoriteNewsCache {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self { prefs }
    }
}

impl FavoriteCache for FavoriteNewsCache {
    fn favorites(&self) -> Vec<Article> {
        self.prefs.get(keys::FAVORITES).unwrap_or_default()
    }

    fn save(&mut self, article: &Article) {
        let mut favorites = self.favorites();
        if favorites.contains(article) {
            return;
        }
        favorites.insert(0, article.clone());
        self.prefs.set(keys::FAVORITES, &favorites);
    }

    fn delete(&mut self, article: &Article) {
        let mut favorites = self.favorites();
        let before = favorites.len();
        favorites.retain(|a| a != article);
        if favorites.len() != before {
            self.prefs.set(keys::FAVORITES, &favorites);
        }
    }
}

/// Notification switch and delivery time.
#[derive(Clone)]
pub struct SettingsHolder {
    prefs: PreferenceStore,
}

impl SettingsHolder {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self { prefs }
    }
}

impl NotificationSettings for SettingsHolder {
    fn notifications_enabled(&self) -> bool {
        self.prefs
            .get(keys::NOTIFICATIONS_ENABLED)
            .unwrap_or(true)
    }

    fn set_notifications_enabled(&mut self, enabled: bool) {
        self.prefs.set(keys::NOTIFICATIONS_ENABLED, &enabled);
    }

    fn time(&self) -> (u32, u32) {
        let hour = self
            .prefs
            .get(keys::NOTIFICATIONS_HOUR)
            .unwrap_or(DEFAULT_NOTIFICATION_HOUR);
        let minute = self
            .prefs
            .get(keys::NOTIFICATIONS_MINUTE)
            .unwrap_or(DEFAULT_NOTIFICATION_MINUTE);
        (hour, minute)
    }

    fn update_time(&mut self, hour: u32, minute: u32) {
        self.prefs.set(keys::NOTIFICATIONS_HOUR, &hour);
        self.prefs.set(keys::NOTIFICATIONS_MINUTE, &minute);
    }
}

/// Catalogue filters of the source screen.
#[derive(Clone)]
pub struct StoredSourceParameters {
    prefs: PreferenceStore,
}

impl StoredSourceParameters {
    pub fn new(prefs: PreferenceStore) -> Self {
        Self { prefs }
    }

    fn put<T: serde::Serialize>(&self, key: &str, value: Option<T>) {
        match value {
            Some(value) => self.prefs.set(key, &value),
            None => self.prefs.remove(key),
        }
    }
}

impl SourceParameterHolder for StoredSourceParameters {
    fn category(&self) -> Option<SourceCategory> {
        self.prefs.get(keys::SOURCES_CATEGORY)
    }

    fn set_category(&mut self, category: Option<SourceCategory>) {
        self.put(keys::SOURCES_CATEGORY, category);
    }

    fn language(&self) -> Option<Language> {
        self.prefs.get(keys::SOURCES_LANGUAGE)
    }

    fn set_language(&mut self, language: Option<Language>) {
        self.put(keys::SOURCES_LANGUAGE, language);
    }

    fn country(&self) -> Option<Country> {
        self.prefs.get(keys::SOURCES_COUNTRY)
    }

    fn set_country(&mut self, country: Option<Country>) {
        self.put(keys::SOURCES_COUNTRY, country);
    }
}
