//! `subfeed watched` / `subfeed unwatched`: toggle an item's watched mark.

use console::style;

use crate::commands::shared::{Access, open_engine};
use crate::config::Config;

pub(crate) async fn handle_watched(
    channel_id: String,
    item_id: String,
    watched: bool,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(config, database_url, Access::Offline).await?;

    let changed = if watched {
        engine.set_watched(&channel_id, &item_id).await?
    } else {
        engine.set_unwatched(&channel_id, &item_id).await?
    };

    let state = if watched { "watched" } else { "unwatched" };
    if changed {
        println!("{} {item_id} marked {state}", style("✓").green());
    } else {
        println!("{item_id} already {state}");
    }
    println!(
        "{} unwatched in {}",
        engine.unwatched_count(&channel_id)?,
        engine.channel_name(&channel_id)?
    );
    Ok(())
}
