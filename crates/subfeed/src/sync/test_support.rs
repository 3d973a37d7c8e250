//! In-memory fakes shared by the sync unit tests.

use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use super::types::Item;
use crate::remote::{self, ChannelIndex, ContainerRef, FollowedChannel, RemoteError};

/// An item whose upload time is `minute` minutes after a fixed epoch.
pub fn item(id: &str, minute: i64) -> Item {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Item {
        id: id.to_string(),
        title: format!("Title {id}"),
        description: String::new(),
        uploaded_at: base + Duration::minutes(minute),
        thumbnail: String::new(),
    }
}

/// Items `v{n}` for each `n` in `range`, ascending.
pub fn items(range: RangeInclusive<i64>) -> Vec<Item> {
    range.map(|n| item(&format!("v{n}"), n)).collect()
}

#[derive(Default)]
struct FakeState {
    followed: Vec<FollowedChannel>,
    containers: HashMap<String, ContainerRef>,
    memberships: HashMap<String, Vec<String>>,
    details: HashMap<String, Item>,
    extra_details: Vec<Item>,
    fail_listing: bool,
    fail_resolve: HashSet<String>,
    fail_membership: HashSet<String>,
    fail_details: bool,
    resolve_calls: Vec<String>,
    membership_calls: Vec<String>,
    detail_calls: Vec<Vec<String>>,
}

/// Scriptable [`ChannelIndex`] that records every call.
#[derive(Default)]
pub struct FakeIndex {
    state: Mutex<FakeState>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().expect("fake index lock");
        f(&mut state)
    }

    /// Follow a channel whose uploads live in container `UU{id}`.
    pub fn follow(&self, id: &str, name: &str) {
        self.with_state(|s| {
            s.followed.push(FollowedChannel::new(id, name, format!("https://thumb/{id}")));
            s.containers
                .insert(id.to_string(), ContainerRef::new(format!("UU{id}")));
        });
    }

    pub fn rename(&self, id: &str, name: &str) {
        self.with_state(|s| {
            for channel in s.followed.iter_mut().filter(|c| c.id == id) {
                channel.name = name.to_string();
            }
        });
    }

    /// Set the ids listed in a channel's container and register their details.
    pub fn set_uploads(&self, channel_id: &str, uploads: &[Item]) {
        self.with_state(|s| {
            s.memberships.insert(
                format!("UU{channel_id}"),
                uploads.iter().rev().map(|i| i.id.clone()).collect(),
            );
            for upload in uploads {
                s.details.insert(upload.id.clone(), upload.clone());
            }
        });
    }

    /// Keep an id listed but stop returning its details, like a private or
    /// scheduled upload.
    pub fn withhold_detail(&self, item_id: &str) {
        self.with_state(|s| {
            s.details.remove(item_id);
        });
    }

    /// Items returned by every detail call whether requested or not.
    pub fn add_unrequested_detail(&self, item: Item) {
        self.with_state(|s| s.extra_details.push(item));
    }

    pub fn fail_listing(&self) {
        self.with_state(|s| s.fail_listing = true);
    }

    pub fn fail_resolve(&self, channel_id: &str) {
        self.with_state(|s| {
            s.fail_resolve.insert(channel_id.to_string());
        });
    }

    pub fn fail_membership(&self, channel_id: &str) {
        self.with_state(|s| {
            s.fail_membership.insert(format!("UU{channel_id}"));
        });
    }

    pub fn fail_details(&self, fail: bool) {
        self.with_state(|s| s.fail_details = fail);
    }

    pub fn resolve_calls(&self) -> Vec<String> {
        self.with_state(|s| s.resolve_calls.clone())
    }

    pub fn membership_calls(&self) -> Vec<String> {
        self.with_state(|s| s.membership_calls.clone())
    }

    pub fn detail_calls(&self) -> Vec<Vec<String>> {
        self.with_state(|s| s.detail_calls.clone())
    }
}

#[async_trait]
impl ChannelIndex for FakeIndex {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_followed_channels(&self) -> remote::Result<Vec<FollowedChannel>> {
        self.with_state(|s| {
            if s.fail_listing {
                return Err(RemoteError::api(500, "listing failed"));
            }
            Ok(s.followed.clone())
        })
    }

    async fn resolve_item_container(&self, channel_id: &str) -> remote::Result<ContainerRef> {
        self.with_state(|s| {
            s.resolve_calls.push(channel_id.to_string());
            if s.fail_resolve.contains(channel_id) {
                return Err(RemoteError::api(500, "resolve failed"));
            }
            s.containers
                .get(channel_id)
                .cloned()
                .ok_or_else(|| RemoteError::not_found(channel_id))
        })
    }

    async fn list_container_item_ids(&self, container: &ContainerRef) -> remote::Result<Vec<String>> {
        self.with_state(|s| {
            s.membership_calls.push(container.to_string());
            if s.fail_membership.contains(container.as_str()) {
                return Err(RemoteError::network("connection reset"));
            }
            Ok(s.memberships.get(container.as_str()).cloned().unwrap_or_default())
        })
    }

    async fn fetch_item_details(&self, item_ids: &[String]) -> remote::Result<Vec<Item>> {
        self.with_state(|s| {
            assert!(!item_ids.is_empty(), "detail fetch with an empty id set");
            s.detail_calls.push(item_ids.to_vec());
            if s.fail_details {
                return Err(RemoteError::api(500, "details failed"));
            }
            let mut found: Vec<Item> = item_ids
                .iter()
                .filter_map(|id| s.details.get(id).cloned())
                .collect();
            found.extend(s.extra_details.iter().cloned());
            Ok(found)
        })
    }
}
