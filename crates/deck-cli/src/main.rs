//! `deck` drives the media player core from the command line.
//!
//! State lives in a file-backed snapshot store, so each invocation hydrates the
//! player, applies one command and exits. `play` runs the queue against a
//! simulated clock.

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use media_player::config::PlayerConfig;
use media_player::events::PlayerEvent;
use media_player::persistence::FileStore;
use media_player::simulated::SimulatedSource;
use media_player::{MediaItem, PlayerHandle};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};

const DEFAULT_STORE_DIR: &str = ".media-deck";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,media_player=info,deck=info")
        }))
        .init();

    let cfg = match args.config.as_ref() {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    let store_dir = args
        .store_dir
        .clone()
        .or_else(|| cfg.storage_dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
    let store = Arc::new(FileStore::new(store_dir));

    match args.cmd {
        Command::Status => {
            let player = PlayerHandle::new(Box::new(SimulatedSource::new(0.0)), store, &cfg);
            print_snapshot(&player)
        }
        Command::Play {
            playlist,
            start,
            tick_ms,
            step_secs,
            default_duration,
        } => {
            let items = read_playlist(&playlist)?;
            let clock = items.iter().fold(
                SimulatedSource::new(default_duration),
                |clock, item| match item.duration_secs() {
                    Some(secs) => clock.with_duration(item.uri(), secs),
                    None => clock,
                },
            );
            let player = PlayerHandle::new(Box::new(clock.clone()), store, &cfg);
            drive_queue(&player, &clock, items, start, step_secs, tick_ms).await?;
            print_snapshot(&player)
        }
        Command::Enqueue { item } => {
            let item = read_item(&item)?;
            let player = PlayerHandle::new(Box::new(SimulatedSource::new(0.0)), store, &cfg);
            if !player.enqueue(item) {
                return Err(anyhow::anyhow!(
                    "item kind does not match the queued media"
                ));
            }
            print_snapshot(&player)
        }
        Command::Dequeue { index } => {
            let player = PlayerHandle::new(Box::new(SimulatedSource::new(0.0)), store, &cfg);
            if !player.dequeue(index) {
                return Err(anyhow::anyhow!("no queue entry at index {index}"));
            }
            print_snapshot(&player)
        }
        Command::Clear => {
            let player = PlayerHandle::new(Box::new(SimulatedSource::new(0.0)), store, &cfg);
            player.clear_queue();
            print_snapshot(&player)
        }
        Command::Volume { value } => {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow::anyhow!("volume must be within 0.0..=1.0"));
            }
            let player = PlayerHandle::new(Box::new(SimulatedSource::new(0.0)), store, &cfg);
            player.set_volume(value);
            print_snapshot(&player)
        }
    }
}

fn print_snapshot(player: &PlayerHandle) -> Result<()> {
    let json = serde_json::to_string_pretty(&player.snapshot()).context("encode snapshot")?;
    println!("{json}");
    Ok(())
}

fn read_playlist(path: &Path) -> Result<Vec<MediaItem>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("read playlist {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse playlist {:?}", path))
}

fn read_item(path: &Path) -> Result<MediaItem> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read item {:?}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parse item {:?}", path))
}

/// Start the queue and tick the clock until playback stops.
async fn drive_queue(
    player: &PlayerHandle,
    clock: &SimulatedSource,
    items: Vec<MediaItem>,
    start: usize,
    step_secs: f64,
    tick_ms: u64,
) -> Result<()> {
    if !step_secs.is_finite() || step_secs <= 0.0 {
        return Err(anyhow::anyhow!("step must be a positive number of seconds"));
    }
    let mut events = player.subscribe();
    if !player.play_queue_from(items, start).await {
        return Err(anyhow::anyhow!(
            "playlist rejected: empty, mixed media kinds, or start index out of range"
        ));
    }
    loop {
        let exhausted = log_events(&mut events);
        if exhausted || !player.snapshot().is_playing {
            break;
        }
        for event in clock.advance(step_secs) {
            player.handle_media_event(event).await;
        }
        if tick_ms > 0 {
            tokio::time::sleep(Duration::from_millis(tick_ms)).await;
        }
    }
    Ok(())
}

/// Log pending player events; returns `true` once the queue ran out.
fn log_events(events: &mut tokio::sync::broadcast::Receiver<PlayerEvent>) -> bool {
    let mut exhausted = false;
    loop {
        match events.try_recv() {
            Ok(PlayerEvent::TimeChanged { position }) => {
                tracing::debug!(position, "position");
            }
            Ok(PlayerEvent::PlaybackFailed { item_id, message }) => {
                tracing::warn!(item_id = ?item_id, error = %message, "playback failed");
            }
            Ok(PlayerEvent::QueueExhausted) => {
                tracing::info!("queue finished");
                exhausted = true;
            }
            Ok(event) => tracing::debug!(?event, "player event"),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event log lagged");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    exhausted
}
