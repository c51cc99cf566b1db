//! Configuration loading and parsing.
//!
//! Defines the player config schema and resolves defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use media_types::MediaKind;
use serde::Deserialize;

use crate::policy::{BoundaryPolicy, PolicySet, PreviousAtStart, QueueExhausted};

pub const DEFAULT_VOLUME: f32 = 0.7;
pub const DEFAULT_STORAGE_KEY: &str = "media-deck.player";
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Top-level player configuration loaded from TOML.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PlayerConfig {
    /// Volume used when no persisted state exists (0.0..=1.0).
    pub initial_volume: Option<f32>,
    /// Key under which the player snapshot is persisted.
    pub storage_key: Option<String>,
    /// Directory for the file-backed snapshot store.
    pub storage_dir: Option<String>,
    /// Capacity of the player event channel.
    pub event_capacity: Option<usize>,
    /// Boundary overrides for music tracks.
    pub track: Option<PolicyConfig>,
    /// Boundary overrides for podcast episodes.
    pub episode: Option<PolicyConfig>,
}

/// Boundary-policy overrides for one media kind.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PolicyConfig {
    pub previous_at_start: Option<PreviousAtStart>,
    pub exhausted: Option<QueueExhausted>,
}

impl PlayerConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("parse config {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let cfg = toml::from_str::<PlayerConfig>(raw)?;
        if let Some(volume) = cfg.initial_volume {
            if !(0.0..=1.0).contains(&volume) {
                return Err(anyhow::anyhow!(
                    "initial_volume must be within 0.0..=1.0, got {volume}"
                ));
            }
        }
        Ok(cfg)
    }

    pub fn initial_volume(&self) -> f32 {
        self.initial_volume.unwrap_or(DEFAULT_VOLUME)
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir.as_deref().and_then(|dir| {
            let trimmed = dir.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(PathBuf::from(trimmed))
            }
        })
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity
            .unwrap_or(DEFAULT_EVENT_CAPACITY)
            .max(1)
    }

    /// Built-in boundary policies with any configured overrides applied.
    pub fn policies(&self) -> PolicySet {
        PolicySet {
            track: resolve_policy(MediaKind::Track, self.track.as_ref()),
            episode: resolve_policy(MediaKind::Episode, self.episode.as_ref()),
        }
    }
}

fn resolve_policy(kind: MediaKind, overrides: Option<&PolicyConfig>) -> BoundaryPolicy {
    let mut policy = BoundaryPolicy::for_kind(kind);
    if let Some(overrides) = overrides {
        if let Some(previous) = overrides.previous_at_start {
            policy.previous_at_start = previous;
        }
        if let Some(exhausted) = overrides.exhausted {
            policy.exhausted = exhausted;
        }
    }
    policy
}
