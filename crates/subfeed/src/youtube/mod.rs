//! YouTube Data API v3 implementation of [`ChannelIndex`](crate::remote::ChannelIndex).
//!
//! # Module Structure
//!
//! - [`error`] - Error types for YouTube API operations
//! - [`types`] - Wire types for the endpoints we call
//! - [`client`] - Resource helper and the `ChannelIndex` implementation
//! - [`convert`] - Conversion from wire types to domain types
//!
//! ```ignore
//! use subfeed::youtube::YoutubeClient;
//!
//! let client = YoutubeClient::new(Some("api-key".into()), Some("oauth-token".into()))?;
//! let channels = client.list_followed_channels().await?;
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, MAX_SUBSCRIPTION_PAGES, PAGE_SIZE, YoutubeClient};
pub use convert::{best_thumbnail, to_followed_channel, to_item};
pub use error::{YoutubeError, short_error_message};
pub use types::{
    ApiErrorBody, Subscription, SubscriptionListResponse, Thumbnail, Thumbnails, Video,
    VideoListResponse,
};
