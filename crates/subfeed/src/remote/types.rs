use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::Result;
use crate::sync::Item;

/// A channel the user follows, as listed by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowedChannel {
    pub id: String,
    pub name: String,
    pub thumbnail: String,
}

impl FollowedChannel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thumbnail: thumbnail.into(),
        }
    }
}

/// Opaque handle to the remote container listing a channel's uploads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerRef(String);

impl ContainerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of truth for followed channels and their current uploads.
///
/// Implementations must be cheap to share across tasks; the engine holds them
/// behind an `Arc` and calls them from many reconciliations at once.
#[async_trait]
pub trait ChannelIndex: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Every followed channel, in the remote's order.
    async fn list_followed_channels(&self) -> Result<Vec<FollowedChannel>>;

    /// Resolve the container holding a channel's uploads.
    async fn resolve_item_container(&self, channel_id: &str) -> Result<ContainerRef>;

    /// Item ids currently in a container, in the remote's order.
    async fn list_container_item_ids(&self, container: &ContainerRef) -> Result<Vec<String>>;

    /// Fetch full details for a batch of item ids in a single request.
    ///
    /// Callers never pass an empty slice.
    async fn fetch_item_details(&self, item_ids: &[String]) -> Result<Vec<Item>>;
}
