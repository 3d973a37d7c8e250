//! Subfeed - a local cache of followed YouTube channels and their uploads.
//!
//! The library keeps a bounded, deduplicated, chronologically ordered cache of
//! each followed channel's recent uploads in step with the YouTube Data API.
//!
//! # Features
//!
//! - `youtube` - Enables the reqwest-backed transport and [`youtube::YoutubeClient`].
//! - `migrate` - Enables database migration support. When enabled, you can use
//!   [`connect_and_migrate`] to create the schema on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use subfeed::{connect_and_migrate, store::DbStore, sync::SyncEngine, youtube::YoutubeClient};
//!
//! let db = connect_and_migrate("sqlite://subfeed.db?mode=rwc").await?;
//! let client = YoutubeClient::new(Some(api_key), Some(token))?;
//! let mut engine = SyncEngine::load(Arc::new(client), Arc::new(DbStore::new(db))).await?;
//!
//! let order = engine.discover_subscriptions(None).await?;
//! engine.persist().await?;
//! let report = engine.refresh_all(&order, None).await?;
//! ```

pub mod db;
pub mod entity;
pub mod http;
pub mod remote;
pub mod retry;
pub mod store;
pub mod sync;
pub mod view;

#[cfg(feature = "youtube")]
pub mod youtube;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use remote::{ChannelIndex, ContainerRef, FollowedChannel, RemoteError};
pub use store::{CacheStore, DbStore, MemoryStore, StoreError};
pub use sync::{Cache, Channel, Item, RefreshReport, SyncEngine, SyncError, SyncProgress};
pub use view::{Escaping, display_order, render_description};
