//! Persistent key/value storage for the serialized cache.
//!
//! The engine only ever reads and overwrites whole values by key, so the
//! contract is two calls. [`DbStore`] keeps values in the `cache_blob` table;
//! [`MemoryStore`] keeps them in a map for tests and dry runs.

mod db;
mod memory;

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

pub use db::DbStore;
pub use memory::MemoryStore;

/// Errors that can occur while reading or writing stored values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Get/set by key. Values are opaque strings; `set` replaces the whole value.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
