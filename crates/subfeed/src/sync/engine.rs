//! The sync engine: owns the cache and drives discovery and refresh.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::task::JoinSet;

use super::errors::{Result, SyncError};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::reconcile::{ChannelUpdate, reconcile_snapshot};
use super::types::{CACHE_KEY, Cache, Channel, ChannelFailure, Item, RefreshReport, WATCHED_KEY};
use super::watched::WatchedSet;
use crate::remote::{ChannelIndex, ContainerRef, short_error_message};
use crate::store::CacheStore;

/// Keeps a local cache of followed channels and their uploads in step with a
/// [`ChannelIndex`], persisting it through a [`CacheStore`].
///
/// One engine exclusively owns its cache; every mutation happens on the task
/// that holds `&mut self`.
pub struct SyncEngine {
    index: Arc<dyn ChannelIndex>,
    store: Arc<dyn CacheStore>,
    cache: Cache,
    watched: WatchedSet,
}

impl SyncEngine {
    /// Create an engine with an empty cache.
    pub fn new(index: Arc<dyn ChannelIndex>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            index,
            store,
            cache: Cache::default(),
            watched: WatchedSet::default(),
        }
    }

    /// Create an engine from whatever the store holds. Missing keys start empty.
    pub async fn load(index: Arc<dyn ChannelIndex>, store: Arc<dyn CacheStore>) -> Result<Self> {
        let cache = match store.get(CACHE_KEY).await? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Cache::default(),
        };
        let watched = match store.get(WATCHED_KEY).await? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => WatchedSet::default(),
        };
        tracing::debug!(channels = cache.len(), "Loaded cache");

        Ok(Self {
            index,
            store,
            cache,
            watched,
        })
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Cached channel ids, in the last discovered subscription order.
    pub fn channel_ids(&self) -> Vec<String> {
        self.cache.ordered_ids()
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.cache.get(channel_id)
    }

    pub fn is_channel_loaded(&self, channel_id: &str) -> bool {
        self.cache.contains(channel_id)
    }

    fn require(&self, channel_id: &str) -> Result<&Channel> {
        self.cache
            .get(channel_id)
            .ok_or_else(|| SyncError::UnknownChannel(channel_id.to_string()))
    }

    pub fn channel_name(&self, channel_id: &str) -> Result<&str> {
        Ok(&self.require(channel_id)?.name)
    }

    pub fn channel_thumbnail(&self, channel_id: &str) -> Result<&str> {
        Ok(&self.require(channel_id)?.thumbnail)
    }

    /// A copy of a channel's items, ascending by upload time.
    pub fn channel_items(&self, channel_id: &str) -> Result<Vec<Item>> {
        Ok(self.require(channel_id)?.items.clone())
    }

    /// Fetch the followed-channel list, add unseen channels and refresh the
    /// name and thumbnail of known ones.
    ///
    /// Containers for new channels are resolved concurrently. If any listing or
    /// resolution fails nothing is committed and the error is returned. The
    /// cache is not persisted; call [`persist`](Self::persist) afterwards.
    #[tracing::instrument(skip_all, fields(index = self.index.name()))]
    pub async fn discover_subscriptions(
        &mut self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<String>> {
        emit(on_progress, SyncProgress::DiscoveringSubscriptions);

        let listed = self.index.list_followed_channels().await?;
        let mut seen = HashSet::new();
        let followed: Vec<_> = listed
            .into_iter()
            .filter(|channel| seen.insert(channel.id.clone()))
            .collect();
        emit(
            on_progress,
            SyncProgress::SubscriptionsListed {
                count: followed.len(),
            },
        );

        let new_ids: Vec<String> = followed
            .iter()
            .filter(|channel| !self.cache.contains(&channel.id))
            .map(|channel| channel.id.clone())
            .collect();

        let mut containers = self.resolve_containers(new_ids, on_progress).await?;

        let added = containers.len();
        let mut order = Vec::with_capacity(followed.len());
        for channel in followed {
            order.push(channel.id.clone());
            if let Some(existing) = self.cache.channels.get_mut(&channel.id) {
                existing.name = channel.name;
                existing.thumbnail = channel.thumbnail;
            } else if let Some(container) = containers.remove(&channel.id) {
                let new = Channel::new(channel.id.clone(), channel.name, channel.thumbnail, container);
                self.cache.channels.insert(channel.id, new);
            }
        }
        self.cache.order = order.clone();

        tracing::info!(channels = order.len(), added, "Discovery complete");
        emit(
            on_progress,
            SyncProgress::DiscoveryComplete {
                channels: order.len(),
                added,
            },
        );
        Ok(order)
    }

    async fn resolve_containers(
        &self,
        channel_ids: Vec<String>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<HashMap<String, ContainerRef>> {
        let mut resolved = HashMap::with_capacity(channel_ids.len());
        if channel_ids.is_empty() {
            return Ok(resolved);
        }

        emit(
            on_progress,
            SyncProgress::ResolvingContainers {
                count: channel_ids.len(),
            },
        );

        let mut tasks = JoinSet::new();
        for channel_id in channel_ids {
            let index = Arc::clone(&self.index);
            tasks.spawn(async move {
                let result = index.resolve_item_container(&channel_id).await;
                (channel_id, result)
            });
        }

        // Returning early drops the set, which aborts the remaining lookups.
        while let Some(joined) = tasks.join_next().await {
            let (channel_id, result) = joined.map_err(|e| SyncError::Task(e.to_string()))?;
            match result {
                Ok(container) => {
                    emit(
                        on_progress,
                        SyncProgress::ContainerResolved {
                            channel_id: channel_id.clone(),
                        },
                    );
                    resolved.insert(channel_id, container);
                }
                Err(e) => {
                    tracing::warn!(channel = %channel_id, error = %e, "Container lookup failed");
                    return Err(e.into());
                }
            }
        }

        Ok(resolved)
    }

    /// Reconcile one channel and commit the result to the cache.
    ///
    /// Nothing is committed if a remote call fails. The cache is not persisted.
    #[tracing::instrument(skip(self), fields(index = self.index.name()))]
    pub async fn reconcile_channel(&mut self, channel_id: &str) -> Result<Vec<Item>> {
        let snapshot = self.require(channel_id)?.clone();
        let update = reconcile_snapshot(self.index.as_ref(), &snapshot).await?;
        let items = update.items.clone();
        self.commit(channel_id, update);
        Ok(items)
    }

    fn commit(&mut self, channel_id: &str, update: ChannelUpdate) {
        if let Some(channel) = self.cache.channels.get_mut(channel_id) {
            channel.items = update.items;
            channel.evicted = update.evicted;
            channel.unavailable = update.unavailable;
        }
    }

    /// Reconcile every listed channel concurrently, then persist the cache once.
    ///
    /// Results are committed and reported in the order they arrive. A failed
    /// channel keeps its previous items; other channels are unaffected. Ids
    /// repeated in `channel_ids` are reconciled once, unknown ids are reported
    /// as failures without touching the remote.
    #[tracing::instrument(skip_all, fields(index = self.index.name(), requested = channel_ids.len()))]
    pub async fn refresh_all(
        &mut self,
        channel_ids: &[String],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();
        let mut task_channels = HashMap::new();

        for channel_id in channel_ids {
            if !seen.insert(channel_id.as_str()) {
                continue;
            }
            let Some(snapshot) = self.cache.get(channel_id).cloned() else {
                let error = SyncError::UnknownChannel(channel_id.clone());
                self.record_failure(&mut report, channel_id.clone(), error, on_progress);
                continue;
            };

            let index = Arc::clone(&self.index);
            let handle = tasks.spawn(async move {
                let result = reconcile_snapshot(index.as_ref(), &snapshot).await;
                (snapshot.id, result)
            });
            task_channels.insert(handle.id(), channel_id.clone());
        }

        emit(
            on_progress,
            SyncProgress::RefreshingChannels { count: tasks.len() },
        );

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (channel_id, Ok(update)))) => {
                    let added = update.added;
                    let removed = update.removed;
                    self.warn_unavailable(&channel_id, &update, on_progress);
                    self.commit(&channel_id, update);
                    let items = self.channel_items(&channel_id).unwrap_or_default();
                    tracing::debug!(channel = %channel_id, items = items.len(), added, removed, "Channel refreshed");
                    emit(
                        on_progress,
                        SyncProgress::ChannelRefreshed {
                            channel_id: channel_id.clone(),
                            items,
                            added,
                            removed,
                        },
                    );
                    report.refreshed.push(channel_id);
                }
                Ok((_, (channel_id, Err(error)))) => {
                    self.record_failure(&mut report, channel_id, error, on_progress);
                }
                Err(join_error) => {
                    let channel_id = task_channels
                        .get(&join_error.id())
                        .cloned()
                        .unwrap_or_default();
                    let error = SyncError::Task(join_error.to_string());
                    self.record_failure(&mut report, channel_id, error, on_progress);
                }
            }
        }

        emit(on_progress, SyncProgress::Persisting);
        self.persist().await?;

        tracing::info!(
            refreshed = report.refreshed.len(),
            failed = report.failures.len(),
            "Refresh complete"
        );
        emit(
            on_progress,
            SyncProgress::RefreshComplete {
                refreshed: report.refreshed.len(),
                failed: report.failures.len(),
            },
        );
        Ok(report)
    }

    /// Report listed ids whose details the remote withheld for the first time.
    fn warn_unavailable(
        &self,
        channel_id: &str,
        update: &ChannelUpdate,
        on_progress: Option<&ProgressCallback>,
    ) {
        let Some(channel) = self.cache.get(channel_id) else {
            return;
        };
        let fresh: Vec<&str> = update
            .unavailable
            .iter()
            .filter(|id| !channel.unavailable.contains(*id))
            .map(String::as_str)
            .collect();
        if fresh.is_empty() {
            return;
        }
        tracing::warn!(channel = %channel_id, ids = ?fresh, "Upload details unavailable");
        emit(
            on_progress,
            SyncProgress::Warning {
                message: format!(
                    "{channel_id}: details unavailable for {}",
                    fresh.join(", ")
                ),
            },
        );
    }

    fn record_failure(
        &self,
        report: &mut RefreshReport,
        channel_id: String,
        error: SyncError,
        on_progress: Option<&ProgressCallback>,
    ) {
        tracing::warn!(channel = %channel_id, error = %error, "Channel refresh failed");
        emit(
            on_progress,
            SyncProgress::ChannelFailed {
                channel_id: channel_id.clone(),
                error: short_error_message(&error),
            },
        );
        report.failures.push(ChannelFailure { channel_id, error });
    }

    /// Write the whole cache to the store.
    pub async fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.cache)?;
        self.store.set(CACHE_KEY, &blob).await?;
        tracing::debug!(channels = self.cache.len(), bytes = blob.len(), "Persisted cache");
        Ok(())
    }

    async fn persist_watched(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.watched)?;
        self.store.set(WATCHED_KEY, &blob).await?;
        Ok(())
    }

    /// Mark an item watched and persist the watched set.
    ///
    /// Returns `false` if it was already watched.
    pub async fn set_watched(&mut self, channel_id: &str, item_id: &str) -> Result<bool> {
        self.require(channel_id)?;
        let changed = self.watched.insert(channel_id, item_id);
        if changed {
            self.persist_watched().await?;
        }
        Ok(changed)
    }

    /// Mark an item unwatched and persist the watched set.
    ///
    /// Returns `false` if it was not watched.
    pub async fn set_unwatched(&mut self, channel_id: &str, item_id: &str) -> Result<bool> {
        self.require(channel_id)?;
        let changed = self.watched.remove(channel_id, item_id);
        if changed {
            self.persist_watched().await?;
        }
        Ok(changed)
    }

    pub fn is_watched(&self, channel_id: &str, item_id: &str) -> bool {
        self.watched.contains(channel_id, item_id)
    }

    /// Cached items of a channel not marked watched.
    pub fn unwatched_count(&self, channel_id: &str) -> Result<usize> {
        let channel = self.require(channel_id)?;
        Ok(channel
            .items
            .iter()
            .filter(|item| !self.watched.contains(channel_id, &item.id))
            .count())
    }
}
