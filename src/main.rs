use std::{env, path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use log::info;
use tokio::sync::mpsc;

use storyreel::{EventSink, LogMediaFactory, PlayerConfig, PlayerEvent, StoryManifest, StoryPlayer};

/// Forwards player events onto a channel so the main task can follow along.
struct ChannelSink(mpsc::UnboundedSender<PlayerEvent>);

impl EventSink for ChannelSink {
    fn emit(&self, event: PlayerEvent) {
        let _ = self.0.send(event);
    }
}

/// Headless demo: plays a story manifest end-to-end with a logging media
/// factory and exits when the player closes.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let manifest_path = match env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: storyreel <stories.json>"),
    };

    let manifest = StoryManifest::from_path(&manifest_path)?;
    info!(
        "loaded {} stories from {}",
        manifest.stories.len(),
        manifest_path.display()
    );

    let (tx, mut rx) = mpsc::unbounded_channel();

    let player = StoryPlayer::new(
        manifest.stories,
        0,
        false,
        Arc::new(LogMediaFactory),
        Arc::new(ChannelSink(tx)),
        PlayerConfig::default(),
    )?;
    player.open().await?;

    while let Some(event) = rx.recv().await {
        info!("event: {}", serde_json::to_string(&event)?);
        if event == PlayerEvent::Closed {
            break;
        }
    }

    Ok(())
}
