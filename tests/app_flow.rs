//! End-to-end tests of the terminal front end state: real loaders against a
//! mock HTTP server, preferences in an in-memory SQLite database, and key
//! presses fed through the input handler.

use crossterm::event::{KeyCode, KeyModifiers};
use newsdesk::api::ApiEndpoint;
use newsdesk::app::{App, AppChannels, AppContext, AppEvent, Overlay, Screen};
use newsdesk::keybindings::KeybindingRegistry;
use newsdesk::models::{Article, SelectedSource};
use newsdesk::news::Segment;
use newsdesk::notify::DigestRequest;
use newsdesk::storage::{keys, Database, PreferenceStore};
use newsdesk::ui::{handle_app_event, handle_articles_loaded, handle_input, handle_sources_loaded, Action};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCES: &str = r#"{
    "status": "ok",
    "sources": [
        {"id": "abc-news-au", "name": "ABC News (AU)", "description": "Local news.",
         "url": "http://www.abc.net.au/news", "category": "general",
         "language": "en", "country": "au", "sortBysAvailable": ["top"]},
        {"id": "ars-technica", "name": "Ars Technica", "description": "Tech.",
         "url": "http://arstechnica.com", "category": "technology",
         "language": "en", "country": "us", "sortBysAvailable": ["top", "latest"]}
    ]
}"#;

const ABC_ARTICLES: &str = r#"{
    "status": "ok",
    "source": "abc-news-au",
    "sortBy": "top",
    "articles": [
        {"author": "Reporter", "title": "Harbour bridge reopens", "description": "d1",
         "url": "http://www.abc.net.au/news/1", "urlToImage": "http://www.abc.net.au/1.jpg",
         "publishedAt": "2017-05-20T18:00:56Z"},
        {"author": "Reporter", "title": "Storm warning", "description": "d2",
         "url": "http://www.abc.net.au/news/2", "urlToImage": "http://www.abc.net.au/2.jpg",
         "publishedAt": "2017-05-20T17:00:00Z"}
    ]
}"#;

const ARS_ARTICLES: &str = r#"{
    "status": "ok",
    "source": "ars-technica",
    "sortBy": "top",
    "articles": [
        {"author": "Editor", "title": "New chip announced", "description": "d3",
         "url": "https://arstechnica.com/3", "urlToImage": "https://arstechnica.com/3.jpg",
         "publishedAt": "2017-05-20T09:15:00Z"}
    ]
}"#;

async fn mount(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SOURCES))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("source", "abc-news-au"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABC_ARTICLES))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("source", "ars-technica"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARS_ARTICLES))
        .mount(server)
        .await;
}

async fn setup(server: &MockServer) -> (App, AppChannels, PreferenceStore) {
    let db = Database::open(":memory:").await.unwrap();
    let prefs = PreferenceStore::open(db).await.unwrap();
    let endpoint = ApiEndpoint::new(&server.uri(), None)
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    let (app, channels) = App::new(AppContext {
        client: reqwest::Client::new(),
        endpoint: Arc::new(endpoint),
        prefs: prefs.clone(),
        notifications_authorized: true,
        keybindings: KeybindingRegistry::new(),
    });
    (app, channels, prefs)
}

fn press(app: &mut App, code: KeyCode) -> Action {
    handle_input(app, code, KeyModifiers::NONE)
}

/// Apply queued routing requests, as the event loop does between inputs.
fn drain_events(app: &mut App, channels: &mut AppChannels) -> Vec<AppEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = channels.events.try_recv() {
        seen.push(event.clone());
        handle_app_event(app, event);
    }
    seen
}

async fn next_articles(app: &mut App, channels: &mut AppChannels) {
    let loaded = tokio::time::timeout(Duration::from_secs(5), channels.articles.recv())
        .await
        .expect("article load timed out")
        .expect("article channel closed");
    handle_articles_loaded(app, loaded);
}

async fn next_sources(app: &mut App, channels: &mut AppChannels) {
    let loaded = tokio::time::timeout(Duration::from_secs(5), channels.sources.recv())
        .await
        .expect("source load timed out")
        .expect("source channel closed");
    handle_sources_loaded(app, loaded);
}

#[tokio::test]
async fn test_first_launch_selects_sources_then_loads_news() {
    let server = MockServer::start().await;
    mount(&server).await;
    let (mut app, mut channels, prefs) = setup(&server).await;

    // Nothing selected yet: the news screen routes to the source picker.
    app.start();
    assert_eq!(
        drain_events(&mut app, &mut channels),
        vec![AppEvent::OpenSourceSelection]
    );
    assert_eq!(app.screen, Screen::Sources);
    assert!(!app.source_screen().cancel_visible);

    next_sources(&mut app, &mut channels).await;
    assert_eq!(app.sources.sources().len(), 2);

    // An empty selection cannot be confirmed or cancelled.
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Esc);
    assert_eq!(app.screen, Screen::Sources);

    // Tap Ars Technica first, then ABC: fetch order follows the taps.
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.screen, Screen::News);

    assert_eq!(
        drain_events(&mut app, &mut channels),
        vec![AppEvent::RefreshNews]
    );
    assert!(app.news_screen().loading);

    next_articles(&mut app, &mut channels).await;
    next_articles(&mut app, &mut channels).await;

    let store = app.news.store();
    assert_eq!(store.section_count(), 2);
    assert_eq!(store.source(0), "Ars Technica");
    assert_eq!(store.source(1), "ABC News (AU)");
    assert_eq!(store.count(), 3);
    assert!(!app.news_screen().table_hidden);
    assert!(!app.news_screen().loading);

    // The second source was announced as an incremental insert.
    let (status, _) = app.status_message.clone().unwrap();
    assert_eq!(status, "+2 from ABC News (AU)");

    prefs.flush().await;
    let saved: Vec<SelectedSource> = prefs.get(keys::SELECTED_SOURCES).unwrap();
    assert_eq!(
        saved,
        vec![
            SelectedSource::new("ars-technica", "Ars Technica"),
            SelectedSource::new("abc-news-au", "ABC News (AU)"),
        ]
    );
}

#[tokio::test]
async fn test_favorite_from_action_sheet_schedules_digest() {
    let server = MockServer::start().await;
    mount(&server).await;
    let (mut app, mut channels, prefs) = setup(&server).await;
    prefs.set(
        keys::SELECTED_SOURCES,
        &vec![SelectedSource::new("abc-news-au", "ABC News (AU)")],
    );

    app.start();
    next_articles(&mut app, &mut channels).await;
    assert!(!app.news_screen().favorites_segment_visible);

    // Second row, then the action sheet's "favorite" entry.
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('a'));
    drain_events(&mut app, &mut channels);
    assert!(matches!(app.overlay, Some(Overlay::ActionSheet { .. })));
    press(&mut app, KeyCode::Down);
    press(&mut app, KeyCode::Enter);
    assert!(app.overlay.is_none());

    let favorites = app.news.favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].title, "Storm warning");
    assert!(app.news_screen().favorites_segment_visible);

    let pending: DigestRequest = prefs.get(keys::NOTIFICATIONS_PENDING).unwrap();
    assert_eq!(pending.count, 1);
    assert_eq!(pending.body, "1 article");

    // Favorites segment, then unfavorite the only entry.
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.news_screen().segment, Segment::Favorites);
    press(&mut app, KeyCode::Char('f'));
    assert!(app.news.favorites().is_empty());
    assert_eq!(app.news_screen().segment, Segment::News);
    assert!(prefs.get::<DigestRequest>(keys::NOTIFICATIONS_PENDING).is_none());

    prefs.flush().await;
    let stored: Vec<Article> = prefs.get(keys::FAVORITES).unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_settings_menu_disables_digest() {
    let server = MockServer::start().await;
    mount(&server).await;
    let (mut app, mut channels, prefs) = setup(&server).await;

    press(&mut app, KeyCode::Char('n'));
    drain_events(&mut app, &mut channels);
    // Opens on the saved time, 7 PM by default.
    assert_eq!(app.overlay, Some(Overlay::Settings { selected: 3 }));

    // "Disable" sits after the seven time entries.
    for _ in 0..4 {
        press(&mut app, KeyCode::Down);
    }
    press(&mut app, KeyCode::Enter);
    assert!(app.overlay.is_none());
    assert!(!app.news.notifications_enabled());

    prefs.flush().await;
    assert_eq!(prefs.get::<bool>(keys::NOTIFICATIONS_ENABLED), Some(false));
}

#[tokio::test]
async fn test_category_filter_reloads_catalogue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sources"))
        .and(query_param("category", "technology"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SOURCES))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server).await;
    let (mut app, mut channels, _prefs) = setup(&server).await;

    app.open_source_selection();
    next_sources(&mut app, &mut channels).await;
    assert_eq!(app.source_screen().category, "Categories");

    press(&mut app, KeyCode::Char('c'));
    let Some(Overlay::Filter { kind, .. }) = app.overlay.clone() else {
        panic!("expected filter overlay, got {:?}", app.overlay);
    };
    let position = kind
        .options()
        .iter()
        .position(|o| *o == "Technology")
        .unwrap();
    for _ in 0..position {
        press(&mut app, KeyCode::Down);
    }
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.source_screen().category, "Technology");
    assert!(app.source_screen().table_hidden);
    next_sources(&mut app, &mut channels).await;
    assert!(!app.source_screen().table_hidden);
}

#[tokio::test]
async fn test_quit_key() {
    let server = MockServer::start().await;
    let (mut app, _channels, _prefs) = setup(&server).await;
    assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);

    press(&mut app, KeyCode::Char('?'));
    assert_eq!(app.overlay, Some(Overlay::Help));
    // q closes the help overlay instead of quitting.
    assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Continue);
    assert!(app.overlay.is_none());
}
