//! Watched state: which items the user has marked as seen.
//!
//! Kept apart from the synchronized cache and stored under its own key, so a
//! refresh never rewrites it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Set of `(channel id, item id)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchedSet(BTreeMap<String, BTreeSet<String>>);

impl WatchedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an item watched. Returns `false` if it already was.
    pub fn insert(&mut self, channel_id: &str, item_id: &str) -> bool {
        self.0
            .entry(channel_id.to_string())
            .or_default()
            .insert(item_id.to_string())
    }

    /// Mark an item unwatched. Returns `false` if it was not watched.
    pub fn remove(&mut self, channel_id: &str, item_id: &str) -> bool {
        let Some(items) = self.0.get_mut(channel_id) else {
            return false;
        };
        let removed = items.remove(item_id);
        if items.is_empty() {
            self.0.remove(channel_id);
        }
        removed
    }

    pub fn contains(&self, channel_id: &str, item_id: &str) -> bool {
        self.0
            .get(channel_id)
            .is_some_and(|items| items.contains(item_id))
    }

    /// Number of watched items recorded for a channel.
    pub fn count(&self, channel_id: &str) -> usize {
        self.0.get(channel_id).map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let mut watched = WatchedSet::new();
        assert!(watched.insert("UC1", "v1"));
        assert!(!watched.insert("UC1", "v1"));
        assert!(watched.contains("UC1", "v1"));
        assert!(!watched.contains("UC2", "v1"));
        assert_eq!(watched.count("UC1"), 1);

        assert!(watched.remove("UC1", "v1"));
        assert!(!watched.remove("UC1", "v1"));
        assert!(watched.is_empty());
    }

    #[test]
    fn test_serializes_as_map_of_sets() {
        let mut watched = WatchedSet::new();
        watched.insert("UC1", "v2");
        watched.insert("UC1", "v1");
        let json = serde_json::to_string(&watched).expect("serialize");
        assert_eq!(json, r#"{"UC1":["v1","v2"]}"#);
        let back: WatchedSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, watched);
    }
}
