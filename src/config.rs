//! Configuration file parser for ~/.config/newsdesk/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::api::DEFAULT_BASE_URL;

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "NEWSAPI_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Debug output masks `api_key`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// newsapi.org key (alternative to the NEWSAPI_KEY env var).
    /// Env var takes precedence over config file.
    pub api_key: Option<String>,

    /// Base URL the `/articles` and `/sources` endpoints hang off.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Whether the favorites digest may be scheduled. `false` behaves like a
    /// denied notification permission.
    pub notifications_authorized: bool,

    /// Action name to key overrides, e.g. `favorite = "*"`.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            notifications_authorized: true,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("notifications_authorized", &self.notifications_authorized)
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "api_key",
        "base_url",
        "request_timeout_secs",
        "notifications_authorized",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = %config.base_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// The API key to send, if any: the env value when set and non-empty,
    /// otherwise the config file value.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<SecretString> {
        env_value
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("newsdesk_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, "https://newsapi.org/v1");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.notifications_authorized);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsdesk_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        cleanup(&path);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config("partial", "request_timeout_secs = 5\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.notifications_authorized);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_key = "test-key-123"
base_url = "http://localhost:8080/v1"
request_timeout_secs = 10
notifications_authorized = false

[keybindings]
favorite = "*"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("test-key-123"));
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(!config.notifications_authorized);
        assert_eq!(config.keybindings.get("favorite").map(String::as_str), Some("*"));
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "theme = \"dark\"\nrequest_timeout_secs = 7\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.request_timeout_secs, 7);
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_env_key_takes_precedence() {
        let config = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };
        let key = config.resolve_api_key(Some("from-env".into())).unwrap();
        assert_eq!(key.expose_secret(), "from-env");

        let key = config.resolve_api_key(Some("  ".into())).unwrap();
        assert_eq!(key.expose_secret(), "from-file");

        assert!(Config::default().resolve_api_key(None).is_none());
    }

    #[test]
    fn test_debug_masks_api_key() {
        let config = Config {
            api_key: Some("super-secret-key-12345".to_string()),
            ..Config::default()
        };
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_debug_shows_none_when_no_api_key() {
        let debug_output = format!("{:?}", Config::default());
        assert!(debug_output.contains("None"));
        assert!(!debug_output.contains("[REDACTED]"));
    }
}
