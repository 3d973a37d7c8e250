//! Remote channel index contract.
//!
//! The [`ChannelIndex`] trait is the only way the sync engine talks to the
//! outside world: it lists followed channels, resolves each channel's upload
//! container, enumerates the ids currently in a container and fetches item
//! details in batches.
//!
//! # Example
//!
//! ```ignore
//! use subfeed::remote::{ChannelIndex, RemoteError};
//!
//! async fn newest_ids<I: ChannelIndex>(index: &I, channel: &str) -> Result<Vec<String>, RemoteError> {
//!     let container = index.resolve_item_container(channel).await?;
//!     index.list_container_item_ids(&container).await
//! }
//! ```

mod errors;
mod types;

pub use errors::{RemoteError, Result, short_error_message};
pub use types::{ChannelIndex, ContainerRef, FollowedChannel};
