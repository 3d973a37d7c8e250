//! Per-channel diff and merge.
//!
//! The helpers here are pure; [`reconcile_snapshot`] strings them together
//! around the two remote calls and works on a copy of the channel, so a failed
//! remote call leaves the cached channel untouched.

use std::collections::{BTreeSet, HashSet};

use super::errors::Result;
use super::types::{Channel, Item, MAX_ITEMS_PER_CHANNEL};
use crate::remote::ChannelIndex;

/// Result of reconciling one channel, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelUpdate {
    /// New item collection, ascending by upload time.
    pub items: Vec<Item>,
    /// Listed ids not retained because of the cap.
    pub evicted: BTreeSet<String>,
    /// Listed ids whose details were requested but not returned.
    pub unavailable: BTreeSet<String>,
    pub added: usize,
    pub removed: usize,
}

/// Drop items whose id is no longer listed remotely.
pub fn prune(items: Vec<Item>, membership: &[String]) -> Vec<Item> {
    let listed: HashSet<&str> = membership.iter().map(String::as_str).collect();
    items
        .into_iter()
        .filter(|item| listed.contains(item.id.as_str()))
        .collect()
}

/// Listed ids that are neither cached nor in `skip`, deduplicated, in listing
/// order.
pub fn new_item_ids(cached: &[Item], membership: &[String], skip: &BTreeSet<String>) -> Vec<String> {
    let mut seen: HashSet<&str> = cached.iter().map(|item| item.id.as_str()).collect();
    membership
        .iter()
        .filter(|id| !skip.contains(*id))
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

/// Merge fetched items into `existing`, keeping only ids that were requested
/// and not already present. The result is sorted ascending by upload time
/// (stable) and cut to [`MAX_ITEMS_PER_CHANNEL`], dropping the oldest.
///
/// Returns the merged collection and the ids that were cut.
pub fn merge(existing: Vec<Item>, fetched: Vec<Item>, requested: &[String]) -> (Vec<Item>, Vec<String>) {
    let requested: HashSet<&str> = requested.iter().map(String::as_str).collect();
    let mut present: HashSet<String> = existing.iter().map(|item| item.id.clone()).collect();

    let mut items = existing;
    for item in fetched {
        if requested.contains(item.id.as_str()) && present.insert(item.id.clone()) {
            items.push(item);
        }
    }

    sort_ascending(&mut items);
    let dropped = truncate_to_cap(&mut items);
    (items, dropped)
}

/// Stable sort by upload time, oldest first.
pub fn sort_ascending(items: &mut [Item]) {
    items.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
}

/// Remove the oldest items beyond the cap from an ascending collection and
/// return their ids.
pub fn truncate_to_cap(items: &mut Vec<Item>) -> Vec<String> {
    let excess = items.len().saturating_sub(MAX_ITEMS_PER_CHANNEL);
    items.drain(..excess).map(|item| item.id).collect()
}

/// Reconcile a snapshot of `channel` against the remote.
///
/// 1. list the container's current ids
/// 2. prune cached items no longer listed
/// 3. diff listed ids against the cache
/// 4. fetch details for the diff in one call, skipped when the diff is empty
/// 5. merge, sort and cap
pub async fn reconcile_snapshot(index: &dyn ChannelIndex, channel: &Channel) -> Result<ChannelUpdate> {
    let membership = index.list_container_item_ids(&channel.container).await?;

    let before = channel.items.len();
    let mut items = prune(channel.items.clone(), &membership);
    let mut removed = before - items.len();

    let listed: HashSet<&str> = membership.iter().map(String::as_str).collect();
    let mut evicted: BTreeSet<String> = channel
        .evicted
        .iter()
        .filter(|id| listed.contains(id.as_str()))
        .cloned()
        .collect();

    let mut unavailable: BTreeSet<String> = channel
        .unavailable
        .iter()
        .filter(|id| listed.contains(id.as_str()))
        .cloned()
        .collect();

    // Ids cut by the cap stay cut while the channel is still full.
    let mut skip = unavailable.clone();
    if items.len() >= MAX_ITEMS_PER_CHANNEL {
        skip.extend(evicted.iter().cloned());
    }
    let wanted = new_item_ids(&items, &membership, &skip);

    let mut added = 0;
    if wanted.is_empty() {
        tracing::debug!(channel = %channel.id, "No new items");
    } else {
        tracing::debug!(channel = %channel.id, count = wanted.len(), "Fetching item details");
        let fetched = index.fetch_item_details(&wanted).await?;
        let returned: HashSet<&str> = fetched.iter().map(|i| i.id.as_str()).collect();
        let missing: Vec<String> = wanted
            .iter()
            .filter(|id| !returned.contains(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            tracing::debug!(channel = %channel.id, count = missing.len(), "Details not returned");
            unavailable.extend(missing);
        }

        let kept_before: HashSet<String> = items.iter().map(|i| i.id.clone()).collect();
        let (merged, dropped) = merge(items, fetched, &wanted);
        added = merged.iter().filter(|i| !kept_before.contains(&i.id)).count();
        removed += dropped.iter().filter(|id| kept_before.contains(*id)).count();
        evicted.extend(dropped);
        items = merged;
    }

    evicted.retain(|id| !items.iter().any(|item| &item.id == id));

    Ok(ChannelUpdate {
        items,
        evicted,
        unavailable,
        added,
        removed,
    })
}
