//! Subfeed CLI - command-line interface for the subscription upload cache.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::Term;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "subfeed")]
#[command(version)]
#[command(about = "A local cache of your YouTube subscriptions' uploads")]
#[command(
    long_about = "Subfeed keeps a local, deduplicated, chronologically ordered cache of the \
latest uploads from every channel you follow. Refreshes only fetch details for uploads \
that are not cached yet, and each channel keeps at most its 50 most recent uploads."
)]
#[command(after_long_help = r#"EXAMPLES
    Sync your subscriptions and fetch their uploads:
        $ subfeed discover

    Refresh every cached channel, or just a few:
        $ subfeed refresh
        $ subfeed refresh UCxxxxxxxxxxxxxxxxxxxxxx

    Show a channel's uploads, newest first, or write them as HTML:
        $ subfeed uploads UCxxxxxxxxxxxxxxxxxxxxxx
        $ subfeed uploads UCxxxxxxxxxxxxxxxxxxxxxx --html channel.html

    Generate shell completions:
        $ subfeed completions bash > ~/.local/share/bash-completion/completions/subfeed

CONFIGURATION
    Subfeed reads configuration from:
      1. ~/.config/subfeed/config.toml (or $XDG_CONFIG_HOME/subfeed/config.toml)
      2. ./subfeed.toml
      3. Environment variables (SUBFEED_* prefix, sections separated by __)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    SUBFEED_DATABASE__URL                 Database connection string (default: ~/.local/state/subfeed/subfeed.db)
    SUBFEED_YOUTUBE__API_KEY              YouTube Data API key
    SUBFEED_YOUTUBE__TOKEN                OAuth access token (needed to list subscriptions)
    SUBFEED_YOUTUBE__BASE_URL             API root override
    SUBFEED_RETRY__MAX_ATTEMPTS           Attempts per request (default: 2)
    SUBFEED_RETRY__RETRYABLE_STATUSES     Comma-separated retryable statuses (default: 500)
    SUBFEED_RENDER__ESCAPE_DESCRIPTIONS   Escape HTML in descriptions (default: true)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync followed channels, then refresh their uploads
    Discover {
        /// Only update the channel list; don't fetch uploads
        #[arg(short = 'N', long)]
        no_refresh: bool,
    },
    /// Fetch new uploads for cached channels
    Refresh {
        /// Channel id(s) to refresh (default: every cached channel)
        channels: Vec<String>,
    },
    /// List cached channels with upload and unwatched counts
    Channels,
    /// Show a channel's cached uploads, newest first
    Uploads {
        /// Channel id
        channel: String,

        /// Write an HTML page to this file instead of printing
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },
    /// Mark an upload as watched
    Watched {
        /// Channel id
        channel: String,
        /// Upload id
        item: String,
    },
    /// Mark an upload as unwatched
    Unwatched {
        /// Channel id
        channel: String,
        /// Upload id
        item: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("subfeed=info,subfeed_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    // Handle commands that don't require database access first
    if let Commands::Completions { shell } = &cli.command {
        commands::meta::handle_completions(*shell)?;
        return Ok(());
    }

    let database_url = config
        .database_url()
        .ok_or("Failed to determine database URL; set database.url or SUBFEED_DATABASE__URL")?;

    commands::shared::ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Discover { no_refresh } => {
            commands::discover::handle_discover(no_refresh, &config, &database_url).await?;
        }
        Commands::Refresh { channels } => {
            commands::refresh::handle_refresh(channels, &config, &database_url).await?;
        }
        Commands::Channels => {
            commands::channels::handle_channels(&config, &database_url).await?;
        }
        Commands::Uploads { channel, html } => {
            commands::uploads::handle_uploads(channel, html, &config, &database_url).await?;
        }
        Commands::Watched { channel, item } => {
            commands::watched::handle_watched(channel, item, true, &config, &database_url).await?;
        }
        Commands::Unwatched { channel, item } => {
            commands::watched::handle_watched(channel, item, false, &config, &database_url)
                .await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
