use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use newsdesk::api::ApiEndpoint;
use newsdesk::app::{http_client, App, AppContext};
use newsdesk::config::{Config, API_KEY_ENV};
use newsdesk::keybindings::KeybindingRegistry;
use newsdesk::models::SelectedSource;
use newsdesk::news::SourceHolder;
use newsdesk::storage::{Database, DatabaseError, PreferenceStore, SelectedSourceHolder};
use newsdesk::ui;

/// Get the config directory path (~/.config/newsdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("newsdesk");
    Ok(config_dir)
}

/// Parse `id` or `id=Display Name` from the command line.
fn parse_source_arg(arg: &str) -> SelectedSource {
    match arg.split_once('=') {
        Some((id, name)) if !name.trim().is_empty() => SelectedSource::new(id.trim(), name.trim()),
        Some((id, _)) => SelectedSource::new(id.trim(), id.trim()),
        None => SelectedSource::new(arg.trim(), arg.trim()),
    }
}

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "Terminal news reader for newsapi.org")]
struct Args {
    /// Config file (default: ~/.config/newsdesk/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Replace the source selection, e.g. `bbc-news` or `bbc-news=BBC News`
    #[arg(long, value_name = "ID", num_args = 1..)]
    sources: Vec<String>,
}

/// Log to a file in the config directory; the terminal belongs to the UI.
fn init_logging(config_dir: &std::path::Path) -> Result<()> {
    let log_path = config_dir.join("newsdesk.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("newsdesk=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up config directory
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    init_logging(&config_dir)?;

    // User-only access to the key, preferences and logs.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let api_key = config.resolve_api_key(std::env::var(API_KEY_ENV).ok());
    if api_key.is_none() {
        eprintln!(
            "Warning: no API key configured. Set {} or api_key in {}.",
            API_KEY_ENV,
            config_path.display()
        );
    }

    let endpoint = ApiEndpoint::new(&config.base_url, api_key)
        .context("Invalid base_url in config")?
        .with_timeout(config.request_timeout());
    let client = http_client(config.request_timeout())?;

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
        eprintln!("Warning: {}", warning);
    }

    let db_path = config_dir.join("newsdesk.db");

    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of newsdesk appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let prefs = PreferenceStore::open(db)
        .await
        .context("Failed to load preferences")?;

    if !args.sources.is_empty() {
        let seed: Vec<SelectedSource> = args.sources.iter().map(|s| parse_source_arg(s)).collect();
        tracing::info!(count = seed.len(), "Replacing source selection from command line");
        SelectedSourceHolder::new(prefs.clone()).save(&seed);
    }

    let (mut app, channels) = App::new(AppContext {
        client,
        endpoint: Arc::new(endpoint),
        prefs,
        notifications_authorized: config.notifications_authorized,
        keybindings,
    });

    let result = ui::run(&mut app, channels).await;
    app.shutdown().await;
    result?;

    println!("Goodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_arg() {
        assert_eq!(parse_source_arg("bbc-news"), SelectedSource::new("bbc-news", "bbc-news"));
        assert_eq!(
            parse_source_arg("bbc-news=BBC News"),
            SelectedSource::new("bbc-news", "BBC News")
        );
        assert_eq!(parse_source_arg("cnn="), SelectedSource::new("cnn", "cnn"));
    }
}
