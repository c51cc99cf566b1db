//! Player state and transition helpers.
//!
//! Centralizes every field update so the player only decides *which*
//! transition to apply.

use media_types::{MediaItem, MediaKind, PlaybackPhase, PlayerSnapshot};

use crate::persistence::{PersistedPlayer, SNAPSHOT_VERSION};
use crate::queue::{MediaQueue, uniform_kind};

/// The player's mutable state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Item bound to the media source.
    pub current_item: Option<MediaItem>,
    /// Last known play intent.
    pub is_playing: bool,
    /// Position in seconds.
    pub current_time: f64,
    /// Duration in seconds, 0 until metadata arrives.
    pub duration: f64,
    pub volume: f32,
    pub queue: MediaQueue,
    pub phase: PlaybackPhase,
    /// Most recent playback failure message.
    pub last_error: Option<String>,
}

impl PlayerState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_item: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume,
            queue: MediaQueue::default(),
            phase: PlaybackPhase::Idle,
            last_error: None,
        }
    }

    /// Rebuild state from a persisted snapshot; transport fields start fresh.
    pub fn restore(persisted: PersistedPlayer) -> Self {
        let mut state = Self::new(persisted.volume);
        let queue = if persisted.queue.is_empty() || uniform_kind(&persisted.queue).is_some() {
            persisted.queue
        } else {
            tracing::warn!(
                len = persisted.queue.len(),
                "persisted queue mixes media kinds; dropping it"
            );
            Vec::new()
        };
        state.queue = MediaQueue::from_parts(queue, persisted.current_index);
        if let (Some(item), Some(kind)) = (persisted.current_item.as_ref(), state.queue.kind()) {
            if item.kind() != kind {
                tracing::warn!(
                    item_id = %item.id(),
                    "persisted item kind differs from queue; dropping queue"
                );
                state.queue.clear();
            }
        }
        if persisted.current_item.is_some() {
            state.phase = PlaybackPhase::Paused;
        }
        state.current_item = persisted.current_item;
        state
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.current_item.as_ref().map(MediaItem::kind)
    }

    /// Kind every queued or bound item must share.
    pub fn active_kind(&self) -> Option<MediaKind> {
        self.queue.kind().or_else(|| self.media_kind())
    }

    pub fn persisted(&self) -> PersistedPlayer {
        PersistedPlayer {
            version: SNAPSHOT_VERSION,
            current_item: self.current_item.clone(),
            volume: self.volume,
            queue: self.queue.items().to_vec(),
            current_index: self.queue.current_index(),
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_item: self.current_item.clone(),
            media_kind: self.media_kind(),
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.duration,
            volume: self.volume,
            queue: self.queue.items().to_vec(),
            current_index: self.queue.current_index(),
            phase: self.phase,
            has_next: self.queue.has_next(),
            has_previous: self.queue.has_previous(),
            last_error: self.last_error.clone(),
        }
    }

    /// Bind a new item; playback has been requested but not confirmed.
    pub fn on_bind(&mut self, item: MediaItem) {
        self.current_item = Some(item);
        self.current_time = 0.0;
        self.duration = 0.0;
        self.is_playing = false;
        self.phase = PlaybackPhase::Loading;
    }

    pub fn on_resume_requested(&mut self) {
        self.phase = PlaybackPhase::Loading;
    }

    pub fn on_play_started(&mut self) {
        self.is_playing = true;
        self.phase = PlaybackPhase::Playing;
        self.last_error = None;
    }

    pub fn on_play_failed(&mut self, message: String) {
        self.is_playing = false;
        self.phase = self.resting_phase();
        self.last_error = Some(message);
    }

    pub fn on_pause(&mut self) {
        self.is_playing = false;
        self.phase = self.resting_phase();
    }

    /// Queue ran out; `rewind` also resets the mirrored position.
    pub fn on_exhausted(&mut self, rewind: bool) {
        self.is_playing = false;
        self.phase = self.resting_phase();
        if rewind {
            self.current_time = 0.0;
        }
    }

    pub fn on_metadata(&mut self, duration: f64) {
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
    }

    /// Position signal from the media source; keeps `current_time >= 0`.
    pub fn on_time(&mut self, position: f64) {
        if position.is_finite() {
            self.current_time = position.max(0.0);
        }
    }

    fn resting_phase(&self) -> PlaybackPhase {
        if self.current_item.is_some() {
            PlaybackPhase::Paused
        } else {
            PlaybackPhase::Idle
        }
    }
}
