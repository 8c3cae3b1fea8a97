mod holders;
mod preferences;
mod schema;
mod store;
mod types;

pub use holders::{
    keys, FavoriteNewsCache, SelectedSourceHolder, SettingsHolder, StoredSourceParameters,
    DEFAULT_NOTIFICATION_HOUR, DEFAULT_NOTIFICATION_MINUTE,
};
pub use schema::Database;
pub use store::PreferenceStore;
pub use types::DatabaseError;
