//! Configuration file support for subfeed.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `SUBFEED_`, sections separated by
//!    `__`, e.g. `SUBFEED_YOUTUBE__API_KEY`)
//! 2. Local config file (`./subfeed.toml`)
//! 3. XDG config file (`~/.config/subfeed/config.toml`)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/subfeed/subfeed.db` on
//! Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/subfeed/subfeed.db"  # optional, this is the default
//!
//! [youtube]
//! api_key = "AIza..."  # or SUBFEED_YOUTUBE__API_KEY
//! token = "ya29..."    # OAuth access token, or SUBFEED_YOUTUBE__TOKEN
//!
//! [retry]
//! max_attempts = 2
//! retryable_statuses = [500]
//! min_delay_ms = 250
//! max_delay_ms = 4000
//!
//! [render]
//! escape_descriptions = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigBuilder as Builder, Environment, File, FileFormat};
use config::builder::DefaultState;
use directories::ProjectDirs;
use serde::Deserialize;
use subfeed::retry::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_MIN_DELAY_MS, DEFAULT_RETRYABLE_STATUSES,
    RetryPolicy,
};
use subfeed::view::Escaping;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub youtube: YoutubeConfig,
    pub retry: RetryConfig,
    pub render: RenderConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Defaults to `sqlite://~/.local/state/subfeed/subfeed.db` if not specified.
    pub url: Option<String>,
}

/// YouTube Data API credentials.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// API key used for public lookups.
    pub api_key: Option<String>,
    /// OAuth access token used to list the signed-in user's subscriptions.
    pub token: Option<String>,
    /// API root, for testing against a proxy or emulator.
    pub base_url: Option<String>,
}

/// Retry policy for API requests.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, the first one included.
    pub max_attempts: usize,
    /// HTTP statuses treated as transient.
    pub retryable_statuses: Vec<u16>,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retryable_statuses: DEFAULT_RETRYABLE_STATUSES.to_vec(),
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

/// HTML rendering options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Escape HTML in descriptions before linkifying.
    pub escape_descriptions: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            escape_descriptions: true,
        }
    }
}

impl Config {
    /// Load configuration from the XDG file, `./subfeed.toml` and `SUBFEED_*`
    /// environment variables, later sources overriding earlier ones.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("subfeed.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./subfeed.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        Self::from_builder(builder.add_source(Self::environment()))
    }

    /// `SUBFEED_YOUTUBE__API_KEY` -> `youtube.api_key`.
    fn environment() -> Environment {
        Environment::with_prefix("SUBFEED")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("retry.retryable_statuses")
    }

    fn from_builder(builder: Builder<DefaultState>) -> Self {
        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("subfeed.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.retry.max_attempts)
            .with_retryable_statuses(self.retry.retryable_statuses.clone())
            .with_delays(
                Duration::from_millis(self.retry.min_delay_ms),
                Duration::from_millis(self.retry.max_delay_ms),
            )
    }

    pub fn escaping(&self) -> Escaping {
        Escaping::from_flag(self.render.escape_descriptions)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subfeed").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/subfeed` or `~/.local/state/subfeed`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "subfeed").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
