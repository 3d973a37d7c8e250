use subfeed::sync::SyncProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::DiscoveringSubscriptions => {
                tracing::info!("Listing subscriptions");
            }

            SyncProgress::SubscriptionsListed { count } => {
                tracing::info!(count, "Subscriptions listed");
            }

            SyncProgress::ResolvingContainers { count } => {
                tracing::info!(count, "Resolving upload playlists");
            }

            SyncProgress::ContainerResolved { channel_id } => {
                tracing::debug!(channel = %channel_id, "Upload playlist resolved");
            }

            SyncProgress::DiscoveryComplete { channels, added } => {
                tracing::info!(channels, added, "Discovery complete");
            }

            SyncProgress::RefreshingChannels { count } => {
                tracing::info!(count, "Refreshing channels");
            }

            SyncProgress::ChannelRefreshed {
                channel_id,
                items,
                added,
                removed,
            } => {
                tracing::info!(
                    channel = %channel_id,
                    items = items.len(),
                    added,
                    removed,
                    "Channel refreshed"
                );
            }

            SyncProgress::ChannelFailed { channel_id, error } => {
                tracing::warn!(channel = %channel_id, error = %error, "Refresh failed");
            }

            SyncProgress::Persisting => {
                tracing::debug!("Saving cache");
            }

            SyncProgress::RefreshComplete { refreshed, failed } => {
                tracing::info!(refreshed, failed, "Refresh complete");
            }

            SyncProgress::Warning { message } => {
                tracing::warn!(message = %message, "Warning");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
