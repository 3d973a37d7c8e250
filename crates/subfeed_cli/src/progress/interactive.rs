use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use subfeed::sync::SyncProgress;

/// Consolidated progress state to avoid multiple mutex locks.
#[derive(Default)]
struct ProgressState {
    /// Spinner shown while listing subscriptions and resolving playlists.
    discover_bar: Option<ProgressBar>,
    /// One tick per channel reconciled or failed.
    refresh_bar: Option<ProgressBar>,
    added: usize,
}

/// Interactive progress reporter using indicatif.
pub struct InteractiveReporter {
    multi: MultiProgress,
    state: Mutex<ProgressState>,
}

impl InteractiveReporter {
    /// Create a new interactive reporter.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            state: Mutex::new(ProgressState::default()),
        }
    }

    /// A reporter that draws nothing.
    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            state: Mutex::new(ProgressState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub fn refresh_position(&self) -> Option<u64> {
        self.state().refresh_bar.as_ref().map(ProgressBar::position)
    }

    /// Handle a progress event.
    pub fn handle(&self, event: SyncProgress) {
        let mut state = self.state();

        match event {
            SyncProgress::DiscoveringSubscriptions => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.set_prefix(format!("{:12}", "discover"));
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_message("Listing subscriptions...");
                state.discover_bar = Some(bar);
            }

            SyncProgress::SubscriptionsListed { count } => {
                if let Some(bar) = &state.discover_bar {
                    bar.set_message(format!("{count} subscriptions"));
                }
            }

            SyncProgress::ResolvingContainers { count } => {
                if let Some(bar) = &state.discover_bar {
                    bar.set_message(format!("Resolving {count} new channels..."));
                }
            }

            SyncProgress::ContainerResolved { channel_id } => {
                if let Some(bar) = &state.discover_bar {
                    bar.set_message(format!("Resolved {channel_id}"));
                }
            }

            SyncProgress::DiscoveryComplete { channels, added } => {
                if let Some(bar) = state.discover_bar.take() {
                    bar.finish_with_message(format!(
                        "{} {channels} channels ({added} new)",
                        style("✓").green()
                    ));
                }
            }

            SyncProgress::RefreshingChannels { count } => {
                let bar = self.multi.add(ProgressBar::new(count as u64));
                bar.set_style(Self::bar_style());
                bar.set_prefix(format!("{:12}", "refresh"));
                bar.set_message("Fetching uploads...");
                state.refresh_bar = Some(bar);
                state.added = 0;
            }

            SyncProgress::ChannelRefreshed {
                channel_id, added, ..
            } => {
                state.added += added;
                if let Some(bar) = &state.refresh_bar {
                    bar.inc(1);
                    bar.set_message(format!("{channel_id} (+{added})"));
                }
            }

            SyncProgress::ChannelFailed { channel_id, error } => {
                if let Some(bar) = &state.refresh_bar {
                    bar.inc(1);
                    bar.println(format!(
                        "{} {channel_id}: {error}",
                        style("✗").red()
                    ));
                }
            }

            SyncProgress::Persisting => {
                if let Some(bar) = &state.refresh_bar {
                    bar.set_message("Saving...");
                }
            }

            SyncProgress::RefreshComplete { refreshed, failed } => {
                let added = state.added;
                if let Some(bar) = state.refresh_bar.take() {
                    let mark = if failed == 0 {
                        style("✓").green()
                    } else {
                        style("!").yellow()
                    };
                    bar.finish_with_message(format!(
                        "{mark} {refreshed} refreshed, {failed} failed, {added} new uploads"
                    ));
                }
            }

            SyncProgress::Warning { message } => {
                let _ = self
                    .multi
                    .println(format!("{} {message}", style("⚠").yellow()));
            }

            _ => {}
        }
    }

    /// Finish all progress bars.
    pub fn finish(&self) {
        let mut state = self.state();
        if let Some(bar) = state.discover_bar.take() {
            bar.finish_and_clear();
        }
        if let Some(bar) = state.refresh_bar.take() {
            bar.finish();
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
