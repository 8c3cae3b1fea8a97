use std::collections::VecDeque;

use super::presenter::{NewsPresenter, NewsView};
use super::store::{NewsStore, NewsStoreChange};
use super::{
    FavoriteCache, NewsRouter, NewsState, NotificationScheduler, NotificationSettings,
    NotificationSettingsAction, Segment, SourceHolder,
};
use crate::api::{ArticleLoader, Loaded};
use crate::models::{Article, SelectedSource};

/// Collaborators of the news interactor, injected at construction.
pub struct NewsDependencies {
    pub loader: Box<dyn ArticleLoader>,
    pub source_holder: Box<dyn SourceHolder>,
    pub favorites: Box<dyn FavoriteCache>,
    pub scheduler: Box<dyn NotificationScheduler>,
    pub settings: Box<dyn NotificationSettings>,
    pub router: Box<dyn NewsRouter>,
}

/// The request currently being waited on.
struct InFlight {
    source: SelectedSource,
    generation: u64,
}

/// Drives the news screen.
///
/// A refresh walks the selected sources strictly one at a time: the next
/// fetch is only issued from the completion of the previous one. The first
/// batch that fills the empty store is presented as a full reload, every
/// later batch as an incremental insert. The error state is shown only when
/// the whole cycle finished with an empty store.
pub struct NewsInteractor<V> {
    deps: NewsDependencies,
    presenter: NewsPresenter<V>,
    store: NewsStore,
    remaining: VecDeque<SelectedSource>,
    in_flight: Option<InFlight>,
    appeared: bool,
}

impl<V: NewsView> NewsInteractor<V> {
    pub fn new(deps: NewsDependencies, view: V) -> Self {
        Self {
            deps,
            presenter: NewsPresenter::new(view),
            store: NewsStore::new(),
            remaining: VecDeque::new(),
            in_flight: None,
            appeared: false,
        }
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    pub fn presenter(&self) -> &NewsPresenter<V> {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut NewsPresenter<V> {
        &mut self.presenter
    }

    /// True while a refresh cycle still has a request outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// First appearance of the screen. Later calls do nothing.
    pub fn view_did_appear(&mut self) {
        if self.appeared {
            return;
        }
        self.appeared = true;
        self.load_selected_sources();
    }

    /// Restart the whole fetch sequence (pull-to-refresh, new selection).
    pub fn refresh(&mut self) {
        self.load_selected_sources();
    }

    fn load_selected_sources(&mut self) {
        let sources = match self.deps.source_holder.selected_sources() {
            Some(sources) if !sources.is_empty() => sources,
            _ => {
                tracing::info!("No sources selected, opening source selection");
                self.deps.router.open_source_selection();
                return;
            }
        };

        tracing::info!(sources = sources.len(), "Refreshing news");
        self.store.clear();
        self.remaining = sources.into();
        self.in_flight = None;
        self.presenter.present(NewsState::Loading);
        self.load_next();
    }

    fn load_next(&mut self) {
        self.in_flight = self.remaining.pop_front().map(|source| {
            let generation = self.deps.loader.load(&source.id);
            tracing::debug!(source = %source.id, generation, "Fetching source");
            InFlight { source, generation }
        });
    }

    /// Completion of a loader request, delivered on the UI loop.
    ///
    /// Completions of superseded requests are dropped.
    pub fn on_articles_loaded(&mut self, loaded: Loaded<Article>) {
        if !self.deps.loader.is_current(loaded.generation) {
            tracing::debug!(
                generation = loaded.generation,
                "Ignoring stale article load (generation mismatch)"
            );
            return;
        }
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.generation == loaded.generation => in_flight,
            other => {
                self.in_flight = other;
                tracing::debug!(
                    generation = loaded.generation,
                    "Ignoring article load with no matching request"
                );
                return;
            }
        };

        let count = loaded.items.len();
        tracing::debug!(source = %in_flight.source.id, count, "Source loaded");

        if count > 0 {
            self.store.add(loaded.items, &in_flight.source.name);
            match self.store.last_change() {
                NewsStoreChange::Reload => self.presenter.present(NewsState::News),
                change => self.presenter.add_articles(change, &self.store),
            }
        }

        if !self.remaining.is_empty() {
            self.load_next();
        } else if self.store.count() == 0 {
            tracing::warn!("No articles from any selected source");
            self.presenter.present(NewsState::Error);
        }
    }

    /// Article behind a row of the segment currently on screen.
    ///
    /// Indices come from the rendered rows and must be in range.
    pub fn article_at(&self, index: usize, section: usize) -> Article {
        match self.presenter.segment() {
            Segment::News => self.store.article(index, section).clone(),
            Segment::Favorites => self.deps.favorites.favorites()[index].clone(),
        }
    }

    pub fn select(&mut self, index: usize, section: usize) {
        let article = self.article_at(index, section);
        self.deps.router.open_article(&article.url);
    }

    pub fn show_actions(&mut self, index: usize, section: usize) {
        let article = self.article_at(index, section);
        self.deps.router.open_action_sheet(&article);
    }

    pub fn open_settings(&mut self) {
        self.deps.router.open_settings();
    }

    pub fn favorites(&self) -> Vec<Article> {
        self.deps.favorites.favorites()
    }

    pub fn is_favorited(&self, article: &Article) -> bool {
        self.deps.favorites.favorites().contains(article)
    }

    /// Toggle an article's favorite status.
    ///
    /// The cache is updated first; the segment visibility and the favorites
    /// reload are issued afterwards so they observe the new list.
    pub fn favorite(&mut self, article: &Article) {
        if self.is_favorited(article) {
            self.deps.favorites.delete(article);
            self.deps.scheduler.remove_notification(article);
            tracing::debug!(title = %article.title, "Removed favorite");
        } else {
            self.deps.favorites.save(article);
            if self.deps.settings.notifications_enabled() {
                self.deps.scheduler.add_notification(article);
            }
            tracing::debug!(title = %article.title, "Added favorite");
        }

        self.load_favorites_segment();
        self.presenter.reload_favorites();
    }

    /// Show the favorites segment iff there is at least one favorite.
    pub fn load_favorites_segment(&mut self) {
        let visible = !self.deps.favorites.favorites().is_empty();
        self.presenter.present_favorites_segment(visible);
    }

    /// Switch lists. Favorites can only be shown when there are some.
    pub fn switch_segment(&mut self, segment: Segment) {
        if segment == Segment::Favorites && self.deps.favorites.favorites().is_empty() {
            tracing::debug!("No favorites, staying on news");
            return;
        }
        self.presenter.show_segment(segment);
        if segment == Segment::Favorites {
            self.presenter.reload_favorites();
        }
    }

    pub fn apply_notification_setting(&mut self, action: NotificationSettingsAction) {
        tracing::info!(action = action.label(), "Notification setting changed");
        match action {
            NotificationSettingsAction::Disable => {
                self.deps.settings.set_notifications_enabled(false);
                self.deps.scheduler.remove_all();
            }
            NotificationSettingsAction::Enable => {
                self.deps.settings.set_notifications_enabled(true);
                self.deps.scheduler.update_schedule();
            }
            time_action => {
                if let Some((hour, minute)) = time_action.time() {
                    self.deps.settings.update_time(hour, minute);
                    self.deps.scheduler.update_schedule();
                }
            }
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.deps.settings.notifications_enabled()
    }

    pub fn notification_time(&self) -> (u32, u32) {
        self.deps.settings.time()
    }
}
