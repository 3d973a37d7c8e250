//! `subfeed refresh`: reconcile cached channels against their upload lists.

use std::sync::Arc;

use console::style;
use subfeed::sync::RefreshReport;

use crate::commands::shared::{Access, open_engine};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::{INTERRUPTED_EXIT_CODE, run_until_interrupted};

pub(crate) async fn handle_refresh(
    channels: Vec<String>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config, database_url, Access::Remote).await?;

    let targets = if channels.is_empty() {
        engine.channel_ids()
    } else {
        channels
    };
    if targets.is_empty() {
        println!("No channels cached yet. Run `subfeed discover` first.");
        return Ok(());
    }

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let Some(report) = run_until_interrupted(engine.refresh_all(&targets, Some(&callback))).await
    else {
        reporter.finish();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    };
    let report = report?;
    reporter.finish();

    print_failures(&report);
    Ok(())
}

/// One line per failed channel.
pub(crate) fn failure_lines(report: &RefreshReport) -> Vec<String> {
    report
        .failures
        .iter()
        .map(|failure| format!("{}: refresh failed ({})", failure.channel_id, failure.error))
        .collect()
}

/// Print failed channels to stderr. Cached content stays viewable.
pub(crate) fn print_failures(report: &RefreshReport) {
    for line in failure_lines(report) {
        eprintln!("{} {}", style("✗").red(), line);
    }
}
