use anyhow::Result;

use super::schema::Database;

impl Database {
    // ========================================================================
    // User Preferences Operations
    // ========================================================================

    /// Get a single preference value by key.
    ///
    /// Keys use dotted convention: `news.favorites`, `notifications.hour`, etc.
    pub async fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_preferences WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Set a preference value (UPSERT).
    pub async fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_preference(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM user_preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Every stored preference, ordered by key.
    pub async fn all_preferences(&self) -> Result<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM user_preferences ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_preference_missing() {
        let db = test_db().await;
        let value = db.get_preference("nonexistent.key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_set_preference_upsert() {
        let db = test_db().await;
        db.set_preference("notifications.hour", "19").await.unwrap();
        db.set_preference("notifications.hour", "22").await.unwrap();

        let value = db.get_preference("notifications.hour").await.unwrap();
        assert_eq!(value, Some("22".to_string()));
    }

    #[tokio::test]
    async fn test_delete_preference() {
        let db = test_db().await;
        db.set_preference("notifications.pending", "{}").await.unwrap();
        db.delete_preference("notifications.pending").await.unwrap();
        db.delete_preference("never.set").await.unwrap();

        assert_eq!(db.get_preference("notifications.pending").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_all_preferences_ordered() {
        let db = test_db().await;
        db.set_preference("sources.language", "\"en\"").await.unwrap();
        db.set_preference("news.favorites", "[]").await.unwrap();

        let all = db.all_preferences().await.unwrap();
        assert_eq!(
            all,
            vec![
                ("news.favorites".to_string(), "[]".to_string()),
                ("sources.language".to_string(), "\"en\"".to_string()),
            ]
        );
    }
}
