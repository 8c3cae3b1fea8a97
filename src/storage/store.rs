use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{mpsc, oneshot};

use super::schema::Database;
use super::types::DatabaseError;

enum Write {
    Set(String, String),
    Delete(String),
    Flush(oneshot::Sender<()>),
}

/// Preferences served from memory and written through to SQLite.
///
/// Reads never touch the database. Writes update memory immediately and are
/// queued to a single writer task, so they reach the database in issue order.
/// Clones share the same cache and writer.
#[derive(Clone)]
pub struct PreferenceStore {
    values: Arc<RwLock<HashMap<String, String>>>,
    writes: mpsc::UnboundedSender<Write>,
}

impl PreferenceStore {
    /// Load every stored preference and start the writer task.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn open(db: Database) -> Result<Self, DatabaseError> {
        let rows = db
            .all_preferences()
            .await
            .map_err(|e| DatabaseError::Load(e.to_string()))?;
        tracing::debug!(count = rows.len(), "Loaded preferences");

        let (writes, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(db, rx));

        Ok(Self {
            values: Arc::new(RwLock::new(rows.into_iter().collect())),
            writes,
        })
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Decode a JSON value. Undecodable values are treated as missing.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring undecodable preference");
                None
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode preference");
                return;
            }
        };
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), raw.clone());
        self.send(Write::Set(key.to_string(), raw));
    }

    pub fn remove(&self, key: &str) {
        let removed = self
            .values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        if removed.is_some() {
            self.send(Write::Delete(key.to_string()));
        }
    }

    /// Wait until every write issued so far has been applied.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        self.send(Write::Flush(tx));
        if rx.await.is_err() {
            tracing::warn!("Preference writer stopped before flush");
        }
    }

    fn send(&self, write: Write) {
        if self.writes.send(write).is_err() {
            tracing::warn!("Preference writer stopped; change kept in memory only");
        }
    }
}

async fn run_writer(db: Database, mut rx: mpsc::UnboundedReceiver<Write>) {
    while let Some(write) = rx.recv().await {
        match write {
            Write::Set(key, value) => {
                if let Err(e) = db.set_preference(&key, &value).await {
                    tracing::warn!(key = %key, error = %e, "Failed to persist preference");
                }
            }
            Write::Delete(key) => {
                if let Err(e) = db.delete_preference(&key).await {
                    tracing::warn!(key = %key, error = %e, "Failed to delete preference");
                }
            }
            Write::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("Preference writer finished");
}
