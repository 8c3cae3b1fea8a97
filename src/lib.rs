//! newsdesk: a terminal news reader for newsapi.org.
//!
//! Headlines from the user's chosen sources are fetched one source at a time
//! and shown grouped by source. Articles can be saved as favorites and a
//! daily digest reminds the user of what they saved.
//!
//! - [`api`] - HTTP loaders for articles and the source catalogue
//! - [`news`] - the headline screen: store, interactor and presenter
//! - [`sources`] - the source selection screen
//! - [`storage`] - SQLite-backed preferences and the persisted collaborators
//! - [`notify`] - favorites digest scheduling
//! - [`app`] and [`ui`] - the terminal front end

pub mod api;
pub mod app;
pub mod config;
pub mod keybindings;
pub mod models;
pub mod news;
pub mod notify;
pub mod sources;
pub mod storage;
pub mod ui;
pub mod util;
