//! Common re-exports for convenient entity usage.

pub use super::cache_blob::{
    ActiveModel as CacheBlobActiveModel, Column as CacheBlobColumn, Entity as CacheBlob,
    Model as CacheBlobModel,
};
