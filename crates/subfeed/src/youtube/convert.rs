//! Conversion from YouTube wire types to domain types.

use super::types::{Subscription, Thumbnails, Video};
use crate::remote::FollowedChannel;
use crate::sync::Item;

/// Pick the thumbnail URL to cache: medium, then high, then default.
pub fn best_thumbnail(thumbnails: &Thumbnails) -> String {
    [&thumbnails.medium, &thumbnails.high, &thumbnails.default]
        .into_iter()
        .flatten()
        .map(|t| t.url.clone())
        .next()
        .unwrap_or_default()
}

/// Convert a subscription to a followed channel.
///
/// Returns `None` when the subscription does not point at a channel.
pub fn to_followed_channel(subscription: Subscription) -> Option<FollowedChannel> {
    let snippet = subscription.snippet;
    let id = snippet.resource_id.channel_id?;
    let thumbnail = best_thumbnail(&snippet.thumbnails);
    Some(FollowedChannel::new(id, snippet.title, thumbnail))
}

/// Convert a video resource to a cached item.
pub fn to_item(video: Video) -> Item {
    let thumbnail = best_thumbnail(&video.snippet.thumbnails);
    Item {
        id: video.id,
        title: video.snippet.title,
        description: video.snippet.description,
        uploaded_at: video.snippet.published_at,
        thumbnail,
    }
}
