//! Application event handling.
//!
//! Loader completions and routing requests arrive here from the event loop
//! and are forwarded to the interactors or applied to the app state.

use crate::api::Loaded;
use crate::app::{App, AppEvent, Overlay};
use crate::models::{Article, Source};
use crate::news::NotificationSettingsAction;

/// Handle a routing request raised by one of the interactors.
pub fn handle_app_event(app: &mut App, event: AppEvent) {
    tracing::debug!(?event, "Handling app event");
    match event {
        AppEvent::OpenSourceSelection => app.open_source_selection(),
        AppEvent::OpenArticle(url) => app.open_article(&url),
        AppEvent::OpenActionSheet(article) => {
            app.overlay = Some(Overlay::ActionSheet {
                article,
                selected: 0,
            });
        }
        AppEvent::OpenSettings => {
            // Start on the entry matching the saved time, if any.
            let current = app.news.notification_time();
            let selected = NotificationSettingsAction::ALL
                .iter()
                .position(|a| a.time() == Some(current))
                .unwrap_or(0);
            app.overlay = Some(Overlay::Settings { selected });
        }
        AppEvent::RefreshNews => app.news.refresh(),
    }
}

/// Deliver one article fetch result to the news interactor.
pub fn handle_articles_loaded(app: &mut App, loaded: Loaded<Article>) {
    app.news.on_articles_loaded(loaded);
    app.announce_table_update();
    // Sections only grow, but a refresh may have emptied the list.
    app.move_news_cursor(0);
}

/// Deliver one catalogue fetch result to the source interactor.
pub fn handle_sources_loaded(app: &mut App, loaded: Loaded<Source>) {
    app.sources.on_sources_loaded(loaded);
    app.move_source_cursor(0);
}
