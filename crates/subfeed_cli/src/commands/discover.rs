//! `subfeed discover`: sync the followed-channel list, then refresh it.

use std::sync::Arc;

use console::style;

use crate::commands::refresh::print_failures;
use crate::commands::shared::{Access, open_engine};
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::shutdown::{INTERRUPTED_EXIT_CODE, run_until_interrupted};

pub(crate) async fn handle_discover(
    no_refresh: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config, database_url, Access::Remote).await?;
    let known_before = engine.cache().len();

    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();

    let Some(discovered) = run_until_interrupted(engine.discover_subscriptions(Some(&callback))).await
    else {
        reporter.finish();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    };
    let order = match discovered {
        Ok(order) => order,
        Err(e) => {
            reporter.finish();
            return Err(format!("Discovery failed: {e}").into());
        }
    };
    engine.persist().await?;

    let added = engine.cache().len().saturating_sub(known_before);
    tracing::info!(channels = order.len(), added, "Subscriptions saved");

    if no_refresh {
        reporter.finish();
        println!(
            "{} {} channels ({} new)",
            style("✓").green(),
            order.len(),
            added
        );
        return Ok(());
    }

    let Some(report) = run_until_interrupted(engine.refresh_all(&order, Some(&callback))).await
    else {
        reporter.finish();
        std::process::exit(INTERRUPTED_EXIT_CODE);
    };
    let report = report?;
    reporter.finish();
    print_failures(&report);
    Ok(())
}
