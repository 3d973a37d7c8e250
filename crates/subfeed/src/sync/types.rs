//! Cached channel/item model and sync result types.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::SyncError;
use crate::remote::ContainerRef;

/// Maximum number of items retained per channel.
pub const MAX_ITEMS_PER_CHANNEL: usize = 50;

/// Store key holding the serialized [`Cache`].
pub const CACHE_KEY: &str = "channels";

/// Store key holding the serialized watched set.
pub const WATCHED_KEY: &str = "watched";

/// A single upload. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail: String,
}

/// A followed channel and its bounded upload window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    /// Remote handle enumerating the channel's current uploads.
    pub container: ContainerRef,
    /// Ascending by upload time after every reconciliation.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Ids dropped by the size cap that were still listed remotely. They are
    /// not refetched while the channel is full.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub evicted: BTreeSet<String>,
    /// Listed ids the detail fetch did not return. They are not requested
    /// again until they leave the listing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable: BTreeSet<String>,
}

impl Channel {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        thumbnail: impl Into<String>,
        container: ContainerRef,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thumbnail: thumbnail.into(),
            container,
            items: Vec::new(),
            evicted: BTreeSet::new(),
            unavailable: BTreeSet::new(),
        }
    }

    /// Whether an item with this id is cached.
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|item| item.id == item_id)
    }
}

/// Every cached channel plus the last discovered subscription order.
///
/// Serialized as a single JSON blob under [`CACHE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cache {
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
    #[serde(default)]
    pub order: Vec<String>,
}

impl Cache {
    pub fn get(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    pub fn contains(&self, channel_id: &str) -> bool {
        self.channels.contains_key(channel_id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel ids in subscription order, followed by any cached channel the
    /// last discovery did not list.
    pub fn ordered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .order
            .iter()
            .filter(|id| self.channels.contains_key(*id))
            .cloned()
            .collect();
        for id in self.channels.keys() {
            if !self.order.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

/// A channel whose reconciliation failed during a bulk refresh.
#[derive(Debug)]
pub struct ChannelFailure {
    pub channel_id: String,
    pub error: SyncError,
}

/// Outcome of [`SyncEngine::refresh_all`](super::SyncEngine::refresh_all).
///
/// Failed channels keep their pre-refresh items in the persisted cache.
#[derive(Debug, Default)]
#[must_use = "RefreshReport may contain per-channel failures that should be checked"]
pub struct RefreshReport {
    /// Channels reconciled successfully, in completion order.
    pub refreshed: Vec<String>,
    /// Channels that failed, in completion order.
    pub failures: Vec<ChannelFailure>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn channel(id: &str) -> Channel {
        Channel::new(id, format!("name {id}"), "", ContainerRef::new(format!("UU{id}")))
    }

    #[test]
    fn ordered_ids_follow_discovery_order_then_leftovers() {
        let mut cache = Cache::default();
        for id in ["c", "a", "b"] {
            cache.channels.insert(id.to_string(), channel(id));
        }
        cache.order = vec!["c".to_string(), "gone".to_string(), "a".to_string()];

        assert_eq!(cache.ordered_ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn cache_blob_round_trips_through_json() {
        let mut ch = channel("UC1");
        ch.items.push(Item {
            id: "v1".to_string(),
            title: "First".to_string(),
            description: "line\nhttps://example.com".to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            thumbnail: "https://i.ytimg.com/vi/v1/mqdefault.jpg".to_string(),
        });
        let mut cache = Cache::default();
        cache.channels.insert(ch.id.clone(), ch);
        cache.order.push("UC1".to_string());

        let blob = serde_json::to_string(&cache).expect("serialize");
        assert!(!blob.contains("evicted"));
        assert!(!blob.contains("unavailable"));
        let back: Cache = serde_json::from_str(&blob).expect("deserialize");
        assert_eq!(back, cache);
    }

    #[test]
    fn missing_optional_fields_default() {
        let blob = r#"{"channels":{"UC1":{"id":"UC1","name":"One","container":"UU1"}}}"#;
        let cache: Cache = serde_json::from_str(blob).expect("deserialize");
        let ch = cache.get("UC1").expect("channel present");
        assert!(ch.items.is_empty());
        assert!(ch.thumbnail.is_empty());
        assert!(cache.order.is_empty());
    }

    #[test]
    fn refresh_report_counts_failures() {
        let mut report = RefreshReport::default();
        assert!(report.is_success());
        report.failures.push(ChannelFailure {
            channel_id: "UC1".to_string(),
            error: SyncError::UnknownChannel("UC1".to_string()),
        });
        assert!(!report.is_success());
        assert_eq!(report.failed_count(), 1);
    }
}
