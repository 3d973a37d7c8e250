//! `subfeed channels`: list cached channels.

use console::style;
use subfeed::sync::{Channel, SyncEngine};

use crate::commands::shared::{Access, open_engine, truncate};
use crate::config::Config;

pub(crate) async fn handle_channels(
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config, database_url, Access::Offline).await?;
    let lines = channel_lines(&engine)?;
    if lines.is_empty() {
        println!("No channels cached yet. Run `subfeed discover` first.");
        return Ok(());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn channel_lines(engine: &SyncEngine) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut lines = Vec::new();
    for id in engine.channel_ids() {
        let Some(channel) = engine.channel(&id) else {
            continue;
        };
        lines.push(format_channel(channel, engine.unwatched_count(&id)?));
    }
    Ok(lines)
}

fn format_channel(channel: &Channel, unwatched: usize) -> String {
    let name = truncate(&channel.name, 32);
    let counts = format!("{:>3} uploads, {:>3} unwatched", channel.items.len(), unwatched);
    let counts = if unwatched > 0 {
        style(counts).bold().to_string()
    } else {
        style(counts).dim().to_string()
    };
    format!("{name:<32}  {}  {counts}", channel.id)
}
