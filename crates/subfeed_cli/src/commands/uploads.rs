//! `subfeed uploads`: show a channel's cached uploads, newest first.

use std::path::PathBuf;

use console::style;
use subfeed::display_order;
use subfeed::sync::{Item, SyncEngine};
use subfeed::view::{channel_url, item_url, render_channel_page};

use crate::commands::shared::{Access, open_engine, truncate};
use crate::config::Config;

pub(crate) async fn handle_uploads(
    channel_id: String,
    html: Option<PathBuf>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config, database_url, Access::Offline).await?;

    match html {
        Some(path) => {
            let page = channel_page(&engine, &channel_id, config)?;
            std::fs::write(&path, page)?;
            println!("Wrote {}", path.display());
        }
        None => {
            for line in upload_lines(&engine, &channel_id)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn channel_page(
    engine: &SyncEngine,
    channel_id: &str,
    config: &Config,
) -> Result<String, Box<dyn std::error::Error>> {
    let items = display_order(&engine.channel_items(channel_id)?);
    let channel = engine
        .channel(channel_id)
        .ok_or_else(|| format!("Unknown channel: {channel_id}"))?;
    Ok(render_channel_page(
        channel,
        &items,
        |item_id| engine.is_watched(channel_id, item_id),
        config.escaping(),
    ))
}

fn upload_lines(
    engine: &SyncEngine,
    channel_id: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let items = display_order(&engine.channel_items(channel_id)?);
    let name = engine.channel_name(channel_id)?;

    let mut lines = vec![format!(
        "{} ({} unwatched)  {}",
        style(name).bold(),
        engine.unwatched_count(channel_id)?,
        channel_url(channel_id)
    )];
    lines.extend(
        items
            .iter()
            .map(|item| format_upload(item, engine.is_watched(channel_id, &item.id))),
    );
    Ok(lines)
}

fn format_upload(item: &Item, watched: bool) -> String {
    let mark = if watched {
        " ".to_string()
    } else {
        style("●").cyan().to_string()
    };
    format!(
        "{mark} {}  {:<60}  {}",
        item.uploaded_at.format("%Y-%m-%d %H:%M"),
        truncate(&item.title, 60),
        item_url(&item.id)
    )
}
