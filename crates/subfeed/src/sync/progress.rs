//! Progress reporting types for discovery and refresh.
//!
//! Events are emitted from the coordinating task only, in the order results
//! arrive, so a callback never runs concurrently with itself.

use super::types::Item;

/// Progress events emitted by [`SyncEngine`](super::SyncEngine).
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to list followed channels.
    DiscoveringSubscriptions,

    /// The followed-channel listing finished.
    SubscriptionsListed {
        /// Distinct channels listed.
        count: usize,
    },

    /// Resolving upload containers for newly followed channels.
    ResolvingContainers {
        /// Number of new channels being resolved.
        count: usize,
    },

    /// A new channel's container was resolved.
    ContainerResolved {
        /// The channel whose uploads container is now known.
        channel_id: String,
    },

    /// Discovery committed its results to the cache.
    DiscoveryComplete {
        /// Channels in the subscription list.
        channels: usize,
        /// Channels added to the cache by this pass.
        added: usize,
    },

    /// Starting a bulk refresh.
    RefreshingChannels {
        /// Reconciliations launched.
        count: usize,
    },

    /// A channel finished reconciling and its new items were committed.
    ChannelRefreshed {
        /// The reconciled channel.
        channel_id: String,
        /// The channel's items after the refresh, ascending by upload time.
        items: Vec<Item>,
        /// Items added by this refresh.
        added: usize,
        /// Items dropped because they disappeared remotely or fell off the cap.
        removed: usize,
    },

    /// A channel's reconciliation failed; its cached items are unchanged.
    ChannelFailed {
        /// The channel that failed.
        channel_id: String,
        /// Short error message.
        error: String,
    },

    /// Writing the cache to the store.
    Persisting,

    /// Bulk refresh finished and the cache was written.
    RefreshComplete {
        /// Channels reconciled and committed.
        refreshed: usize,
        /// Channels that kept their previous items.
        failed: usize,
    },

    /// Non-fatal condition worth surfacing, such as uploads whose details
    /// the remote withheld.
    Warning {
        /// Human-readable description.
        message: String,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
