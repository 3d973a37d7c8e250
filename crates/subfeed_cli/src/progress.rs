//! Progress reporting for discovery and refresh.
//!
//! This module provides two modes of progress reporting:
//! - Interactive mode (TTY): Animated progress bars using indicatif
//! - Logging mode (non-TTY): Structured logging using tracing

mod interactive;
mod logging;

use std::sync::Arc;

use console::Term;
use subfeed::sync::{ProgressCallback, SyncProgress};

pub use interactive::InteractiveReporter;
pub use logging::LoggingReporter;

/// Progress reporter that handles both interactive and logging modes.
pub enum ProgressReporter {
    /// Interactive progress bars for TTY.
    Interactive(InteractiveReporter),
    /// Structured logging for non-TTY (CI, pipes).
    Logging(LoggingReporter),
}

impl ProgressReporter {
    /// Create a new progress reporter, auto-detecting TTY mode.
    pub fn new() -> Self {
        if Term::stdout().is_term() {
            Self::Interactive(InteractiveReporter::new())
        } else {
            Self::Logging(LoggingReporter::new())
        }
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        match self {
            Self::Interactive(r) => r.handle(event),
            Self::Logging(r) => r.handle(event),
        }
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    /// Finish all progress bars (interactive mode only).
    pub fn finish(&self) {
        if let Self::Interactive(r) = self {
            r.finish();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_callback_accepts_every_event() {
        let reporter = Arc::new(ProgressReporter::Logging(LoggingReporter::new()));
        let callback = reporter.as_callback();

        callback(SyncProgress::DiscoveringSubscriptions);
        callback(SyncProgress::SubscriptionsListed { count: 2 });
        callback(SyncProgress::ResolvingContainers { count: 1 });
        callback(SyncProgress::ContainerResolved {
            channel_id: "UC1".to_string(),
        });
        callback(SyncProgress::DiscoveryComplete {
            channels: 2,
            added: 1,
        });
        callback(SyncProgress::RefreshingChannels { count: 2 });
        callback(SyncProgress::ChannelRefreshed {
            channel_id: "UC1".to_string(),
            items: Vec::new(),
            added: 0,
            removed: 0,
        });
        callback(SyncProgress::ChannelFailed {
            channel_id: "UC2".to_string(),
            error: "boom".to_string(),
        });
        callback(SyncProgress::Persisting);
        callback(SyncProgress::RefreshComplete {
            refreshed: 1,
            failed: 1,
        });
        reporter.finish();
    }

    #[test]
    fn interactive_reporter_tracks_refresh_bar() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::RefreshingChannels { count: 2 });
        reporter.handle(SyncProgress::ChannelRefreshed {
            channel_id: "UC1".to_string(),
            items: Vec::new(),
            added: 3,
            removed: 0,
        });
        assert_eq!(reporter.refresh_position(), Some(1));
        reporter.handle(SyncProgress::ChannelFailed {
            channel_id: "UC2".to_string(),
            error: "boom".to_string(),
        });
        assert_eq!(reporter.refresh_position(), Some(2));
        reporter.handle(SyncProgress::RefreshComplete {
            refreshed: 1,
            failed: 1,
        });
        reporter.finish();
    }

    #[test]
    fn interactive_reporter_ignores_refresh_events_without_bar() {
        let reporter = InteractiveReporter::hidden();
        reporter.handle(SyncProgress::ChannelRefreshed {
            channel_id: "UC1".to_string(),
            items: Vec::new(),
            added: 1,
            removed: 0,
        });
        assert_eq!(reporter.refresh_position(), None);
    }
}
