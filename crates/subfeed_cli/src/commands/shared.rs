//! Engine construction shared by every database-backed command.

use std::path::Path;
use std::sync::Arc;

use subfeed::http::reqwest_transport::{DEFAULT_TIMEOUT, ReqwestTransport};
use subfeed::store::DbStore;
use subfeed::sync::SyncEngine;
use subfeed::youtube::YoutubeClient;
use subfeed::{ChannelIndex, connect_and_migrate};

use crate::config::Config;

/// Whether a command talks to the YouTube API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Credentials are required up front.
    Remote,
    /// Only the local cache is read or written.
    Offline,
}

/// Build the API client from configuration.
pub(crate) fn build_client(
    config: &Config,
    access: Access,
) -> Result<YoutubeClient, Box<dyn std::error::Error>> {
    let api_key = config.youtube.api_key.clone();
    let token = config.youtube.token.clone();

    let client = match access {
        Access::Remote => YoutubeClient::new(api_key, token).map_err(|e| {
            format!(
                "{e}. Set SUBFEED_YOUTUBE__API_KEY or SUBFEED_YOUTUBE__TOKEN \
                 (or youtube.api_key / youtube.token in config.toml)"
            )
        })?,
        Access::Offline => {
            let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)?;
            YoutubeClient::new_with_transport(Arc::new(transport))
                .with_api_key(api_key)
                .with_token(token)
        }
    };

    let client = match &config.youtube.base_url {
        Some(base_url) => client.with_base_url(base_url),
        None => client,
    };
    Ok(client.with_retry_policy(config.retry_policy()))
}

/// Connect to the database, run migrations and load the cached state.
pub(crate) async fn open_engine(
    config: &Config,
    database_url: &str,
    access: Access,
) -> Result<SyncEngine, Box<dyn std::error::Error>> {
    let client: Arc<dyn ChannelIndex> = Arc::new(build_client(config, access)?);
    let db = connect_and_migrate(database_url).await?;
    let engine = SyncEngine::load(client, Arc::new(DbStore::new(db))).await?;
    tracing::debug!(channels = engine.cache().len(), "Loaded cache");
    Ok(engine)
}

/// Create the parent directory of a SQLite database file.
///
/// Returns the file path when `database_url` points at one.
pub(crate) fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<Option<&Path>> {
    let Some(rest) = database_url.strip_prefix("sqlite://") else {
        return Ok(None);
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = rest.split('?').next().unwrap_or(rest);
    if db_path.is_empty() || db_path == ":memory:" {
        return Ok(None);
    }
    let db_path = Path::new(db_path);

    // Warn if using a relative path (can cause issues depending on cwd)
    if db_path.is_relative() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Some(db_path))
}

/// Truncate `text` to `max` characters, appending an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use crate::config::YoutubeConfig;

    #[test]
    fn remote_access_requires_credentials() {
        let config = Config::default();
        let err = build_client(&config, Access::Remote)
            .err()
            .expect("missing credentials should fail");
        assert!(err.to_string().contains("SUBFEED_YOUTUBE__API_KEY"));
    }

    #[test]
    fn offline_access_works_without_credentials() {
        let config = Config::default();
        assert!(build_client(&config, Access::Offline).is_ok());
    }

    #[test]
    fn configured_base_url_is_applied() {
        let config = Config {
            youtube: YoutubeConfig {
                api_key: Some("k".to_string()),
                token: None,
                base_url: Some("http://localhost:9000/v3/".to_string()),
            },
            ..Default::default()
        };
        let client = build_client(&config, Access::Remote).expect("client");
        assert_eq!(client.base_url(), "http://localhost:9000/v3");
        assert_eq!(client.retry_policy().max_attempts, 2);
    }

    #[test]
    fn ensure_sqlite_dir_creates_parent() {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("subfeed-db-test-{nonce}"));
        let url = format!("sqlite://{}/nested/subfeed.db?mode=rwc", dir.display());

        let path = ensure_sqlite_dir(&url).expect("create dir");
        assert!(path.is_some_and(|p| p.ends_with("nested/subfeed.db")));
        assert!(dir.join("nested").is_dir());

        std::fs::remove_dir_all(&dir).expect("test output directory should be removable");
    }

    #[test]
    fn ensure_sqlite_dir_ignores_memory_and_other_schemes() {
        assert!(ensure_sqlite_dir("sqlite::memory:").expect("ok").is_none());
        assert!(ensure_sqlite_dir("postgres://localhost/db").expect("ok").is_none());
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
