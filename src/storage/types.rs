use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another instance of the application has locked the database
    #[error("Another instance of newsdesk appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Reading stored data failed
    #[error("Failed to load stored data: {0}")]
    Load(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}

/// SQLITE_BUSY, SQLITE_LOCKED and SQLITE_CANTOPEN all surface as one of
/// these messages.
pub(crate) fn is_lock_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
        || message.contains("unable to open database file")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_messages() {
        assert!(is_lock_message("error returned from database: database is locked"));
        assert!(is_lock_message("(code: 14) unable to open database file"));
        assert!(!is_lock_message("no such table: user_preferences"));
    }

    #[test]
    fn test_load_error_message() {
        let err = DatabaseError::Load("no such table: user_preferences".into());
        assert_eq!(
            err.to_string(),
            "Failed to load stored data: no such table: user_preferences"
        );
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = DatabaseError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::Other(sqlx::Error::RowNotFound)));
    }
}
