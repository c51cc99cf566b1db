use serde::{Deserialize, Serialize};

/// Kind tag distinguishing music playback from podcast playback.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Music track.
    Track,
    /// Podcast episode.
    Episode,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Track => "track",
            MediaKind::Episode => "episode",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable unit: either a music track or a podcast episode.
///
/// Only the fields needed to resume playback are carried here; anything richer
/// (artwork, descriptions, play counts) belongs to the catalog service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaItem {
    Track {
        /// Catalog identifier.
        id: String,
        /// Display title.
        title: String,
        /// Owning artist identifier.
        artist_id: String,
        /// Playable audio URI.
        uri: String,
        /// Duration hint in seconds; the loaded resource is authoritative.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    Episode {
        /// Catalog identifier.
        id: String,
        /// Display title.
        title: String,
        /// Owning podcast identifier.
        podcast_id: String,
        /// Playable audio URI.
        uri: String,
        /// Duration hint in seconds; the loaded resource is authoritative.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
}

impl MediaItem {
    pub fn track(
        id: impl Into<String>,
        title: impl Into<String>,
        artist_id: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        MediaItem::Track {
            id: id.into(),
            title: title.into(),
            artist_id: artist_id.into(),
            uri: uri.into(),
            duration_secs: None,
        }
    }

    pub fn episode(
        id: impl Into<String>,
        title: impl Into<String>,
        podcast_id: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        MediaItem::Episode {
            id: id.into(),
            title: title.into(),
            podcast_id: podcast_id.into(),
            uri: uri.into(),
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        match &mut self {
            MediaItem::Track { duration_secs, .. } | MediaItem::Episode { duration_secs, .. } => {
                *duration_secs = Some(secs);
            }
        }
        self
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaItem::Track { .. } => MediaKind::Track,
            MediaItem::Episode { .. } => MediaKind::Episode,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MediaItem::Track { id, .. } | MediaItem::Episode { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MediaItem::Track { title, .. } | MediaItem::Episode { title, .. } => title,
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            MediaItem::Track { uri, .. } | MediaItem::Episode { uri, .. } => uri,
        }
    }

    /// Artist id for tracks, podcast id for episodes.
    pub fn owner_id(&self) -> &str {
        match self {
            MediaItem::Track { artist_id, .. } => artist_id,
            MediaItem::Episode { podcast_id, .. } => podcast_id,
        }
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            MediaItem::Track { duration_secs, .. } | MediaItem::Episode { duration_secs, .. } => {
                *duration_secs
            }
        }
    }
}

/// Coarse transport phase of a player.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Nothing bound.
    #[default]
    Idle,
    /// Item bound, waiting for the play request to settle.
    Loading,
    /// Audibly playing.
    Playing,
    /// Item bound but not playing (user pause, failed start, exhausted queue).
    Paused,
}

/// Read-only player state handed to presentation layers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    /// Item bound to the audio resource.
    pub current_item: Option<MediaItem>,
    /// Kind of `current_item`, if any.
    pub media_kind: Option<MediaKind>,
    /// Last known play intent, reconciled with the resource.
    pub is_playing: bool,
    /// Playback position in seconds.
    pub current_time: f64,
    /// Resource duration in seconds (0 until metadata is known).
    pub duration: f64,
    /// Output volume, nominally 0.0..=1.0.
    pub volume: f32,
    /// Pending items of the same kind, in play order.
    pub queue: Vec<MediaItem>,
    /// Position of `current_item` inside `queue`.
    pub current_index: usize,
    /// Transport phase.
    pub phase: PlaybackPhase,
    /// `true` when `next` would move to another queue entry.
    pub has_next: bool,
    /// `true` when `previous` would move to another queue entry.
    pub has_previous: bool,
    /// Most recent playback or resource error, if any.
    pub last_error: Option<String>,
}
