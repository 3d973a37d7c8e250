//! Cache synchronization.
//!
//! # Module Structure
//!
//! - [`types`] - Cached data model: `Cache`, `Channel`, `Item`, `RefreshReport`
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`reconcile`] - Per-channel prune, diff, merge and cap
//! - [`engine`] - `SyncEngine`: discovery, reconciliation, bulk refresh, watched state
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use subfeed::store::MemoryStore;
//! use subfeed::sync::SyncEngine;
//!
//! let mut engine = SyncEngine::load(index, Arc::new(MemoryStore::new())).await?;
//! let order = engine.discover_subscriptions(None).await?;
//! let report = engine.refresh_all(&order, None).await?;
//! for failure in &report.failures {
//!     eprintln!("{}: refresh failed ({})", failure.channel_id, failure.error);
//! }
//! ```

pub mod engine;
mod errors;
mod progress;
pub mod reconcile;
mod types;
mod watched;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::SyncEngine;
pub use errors::{Result, SyncError};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use reconcile::ChannelUpdate;
pub use types::{
    CACHE_KEY, Cache, Channel, ChannelFailure, Item, MAX_ITEMS_PER_CHANNEL, RefreshReport,
    WATCHED_KEY,
};
pub use watched::WatchedSet;
