//! Playback coordination for one media source.
//!
//! [`PlayerHandle`] owns the source, the player state, the boundary policies and
//! the snapshot store. Commands take the lock, apply a state transition, and
//! release it before awaiting the source's play request. Each play request
//! carries a generation number; results that settle after a newer command has
//! rebound or paused the source are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use media_types::{MediaItem, PlaybackPhase, PlayerSnapshot};
use tokio::sync::broadcast;

use crate::config::PlayerConfig;
use crate::events::{EventBus, PlayerEvent};
use crate::persistence::{ItemResolver, SnapshotStore, load_snapshot, save_snapshot};
use crate::policy::{PolicySet, PreviousAtStart, QueueExhausted};
use crate::source::{MediaEvent, MediaSource, PlayRequest};
use crate::state::PlayerState;

struct PlayerCore {
    source: Box<dyn MediaSource>,
    state: PlayerState,
    policies: PolicySet,
    store: Arc<dyn SnapshotStore>,
    storage_key: String,
    generation: u64,
}

struct PendingPlay {
    generation: u64,
    item_id: Option<String>,
    request: PlayRequest,
}

impl PlayerCore {
    fn persist(&self) {
        save_snapshot(self.store.as_ref(), &self.storage_key, &self.state.persisted());
    }

    /// Invalidate any play request still in flight.
    fn bump_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn bind_and_request(&mut self, item: MediaItem) -> PendingPlay {
        tracing::debug!(
            item_id = %item.id(),
            kind = %item.kind(),
            uri = %item.uri(),
            "binding media item"
        );
        self.source.load(item.uri());
        self.state.on_bind(item);
        self.persist();
        self.request_play()
    }

    fn request_play(&mut self) -> PendingPlay {
        let generation = self.bump_generation();
        PendingPlay {
            generation,
            item_id: self.current_item_id(),
            request: self.source.play(),
        }
    }

    fn current_item_id(&self) -> Option<String> {
        self.state
            .current_item
            .as_ref()
            .map(|item| item.id().to_string())
    }

    fn exhaust(&mut self) {
        self.bump_generation();
        let kind = self.state.media_kind().or_else(|| self.state.queue.kind());
        let rewind = kind
            .map(|kind| self.policies.get(kind).exhausted == QueueExhausted::PauseAndRewind)
            .unwrap_or(false);
        if rewind {
            self.source.pause();
            self.source.set_current_time(0.0);
        }
        self.state.on_exhausted(rewind);
        tracing::debug!(rewind, "queue exhausted");
    }

    /// `previous` with nothing earlier in the queue.
    fn previous_at_start(&mut self) -> bool {
        let Some(kind) = self.state.media_kind() else {
            return false;
        };
        match self.policies.get(kind).previous_at_start {
            PreviousAtStart::RestartCurrent => {
                self.source.set_current_time(0.0);
                self.state.on_time(0.0);
                true
            }
            PreviousAtStart::Ignore => false,
        }
    }
}

/// Shared handle to the player; clones observe and drive the same instance.
#[derive(Clone)]
pub struct PlayerHandle {
    inner: Arc<Mutex<PlayerCore>>,
    events: EventBus,
}

impl PlayerHandle {
    /// Create a player and hydrate it from `store`.
    pub fn new(
        source: Box<dyn MediaSource>,
        store: Arc<dyn SnapshotStore>,
        config: &PlayerConfig,
    ) -> Self {
        Self::build(source, store, config, None)
    }

    /// Like [`PlayerHandle::new`], refreshing restored items through a catalog.
    pub fn with_resolver(
        source: Box<dyn MediaSource>,
        store: Arc<dyn SnapshotStore>,
        config: &PlayerConfig,
        resolver: &dyn ItemResolver,
    ) -> Self {
        Self::build(source, store, config, Some(resolver))
    }

    fn build(
        mut source: Box<dyn MediaSource>,
        store: Arc<dyn SnapshotStore>,
        config: &PlayerConfig,
        resolver: Option<&dyn ItemResolver>,
    ) -> Self {
        let storage_key = config.storage_key().to_string();
        let state = match load_snapshot(store.as_ref(), &storage_key) {
            Some(persisted) => {
                let persisted = match resolver {
                    Some(resolver) => persisted.resolve_with(resolver),
                    None => persisted,
                };
                PlayerState::restore(persisted)
            }
            None => PlayerState::new(config.initial_volume()),
        };

        source.set_volume(state.volume);
        if let Some(item) = state.current_item.as_ref() {
            source.load(item.uri());
        }
        tracing::info!(
            storage_key = %storage_key,
            current_item = ?state.current_item.as_ref().map(|item| item.id()),
            queue_len = state.queue.len(),
            volume = state.volume,
            "media player ready"
        );

        Self {
            inner: Arc::new(Mutex::new(PlayerCore {
                source,
                state,
                policies: config.policies(),
                store,
                storage_key,
                generation: 0,
            })),
            events: EventBus::new(config.event_capacity()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerCore> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    /// Subscribe to player events (state changes, failures, exhaustion).
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Read-only copy of the current state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.lock().state.snapshot()
    }

    /// Bind `item` and start playing it.
    ///
    /// An item of a different kind than the queued ones clears the queue first.
    /// Start failures are reported through [`PlayerEvent::PlaybackFailed`].
    pub async fn play_item(&self, item: MediaItem) {
        let (pending, queue_cleared) = {
            let mut core = self.lock();
            let queue_cleared = core
                .state
                .queue
                .kind()
                .is_some_and(|kind| kind != item.kind());
            if queue_cleared {
                tracing::debug!(kind = %item.kind(), "media kind changed; clearing queue");
                core.state.queue.clear();
            }
            (core.bind_and_request(item), queue_cleared)
        };
        if queue_cleared {
            self.events.queue_changed();
        }
        self.events.state_changed();
        self.settle(pending).await;
    }

    /// Replace the queue with `items` and play from `start_index`.
    ///
    /// Returns `false` (without touching state) for an empty or mixed-kind list
    /// or an out-of-range start index.
    pub async fn play_queue_from(&self, items: Vec<MediaItem>, start_index: usize) -> bool {
        if items.is_empty() {
            return false;
        }
        let len = items.len();
        let pending = {
            let mut core = self.lock();
            let Some(item) = core.state.queue.replace(items, start_index).cloned() else {
                tracing::warn!(len, start_index, "rejected queue: mixed kinds or bad start index");
                return false;
            };
            core.bind_and_request(item)
        };
        self.events.queue_changed();
        self.events.state_changed();
        self.settle(pending).await;
        true
    }

    /// Pause when playing (or loading), otherwise request playback.
    pub async fn toggle_play_pause(&self) {
        let pending = {
            let mut core = self.lock();
            if core.state.current_item.is_none() {
                return;
            }
            if core.state.is_playing || core.state.phase == PlaybackPhase::Loading {
                core.bump_generation();
                core.source.pause();
                core.state.on_pause();
                None
            } else {
                core.state.on_resume_requested();
                Some(core.request_play())
            }
        };
        self.events.state_changed();
        if let Some(pending) = pending {
            self.settle(pending).await;
        }
    }

    /// Play the next queue entry, or stop at the end of the queue.
    pub async fn next(&self) {
        let pending = {
            let mut core = self.lock();
            match core.state.queue.advance() {
                Some(item) => Some(core.bind_and_request(item)),
                None => {
                    core.exhaust();
                    None
                }
            }
        };
        match pending {
            Some(pending) => {
                self.events.queue_changed();
                self.events.state_changed();
                self.settle(pending).await;
            }
            None => {
                self.events.queue_exhausted();
                self.events.state_changed();
            }
        }
    }

    /// Play the previous queue entry; at the start, apply the kind's boundary policy.
    pub async fn previous(&self) {
        let (pending, restarted) = {
            let mut core = self.lock();
            match core.state.queue.retreat() {
                Some(item) => (Some(core.bind_and_request(item)), false),
                None => (None, core.previous_at_start()),
            }
        };
        if let Some(pending) = pending {
            self.events.queue_changed();
            self.events.state_changed();
            self.settle(pending).await;
        } else if restarted {
            self.events.time_changed(0.0);
            self.events.state_changed();
        }
    }

    /// Move the source to `seconds` and mirror the position it reports.
    ///
    /// Bounds are whatever the source enforces.
    pub fn seek(&self, seconds: f64) {
        let position = {
            let mut core = self.lock();
            if core.state.current_item.is_none() {
                return;
            }
            core.source.set_current_time(seconds);
            let position = core.source.current_time();
            core.state.current_time = position;
            position
        };
        self.events.time_changed(position);
    }

    /// Set the output volume. The value is passed through unchanged.
    pub fn set_volume(&self, volume: f32) {
        {
            let mut core = self.lock();
            core.source.set_volume(volume);
            core.state.volume = volume;
            core.persist();
        }
        self.events.state_changed();
    }

    /// Append `item`; rejected when its kind differs from the active kind.
    pub fn enqueue(&self, item: MediaItem) -> bool {
        {
            let mut core = self.lock();
            if let Some(kind) = core.state.active_kind() {
                if kind != item.kind() {
                    tracing::warn!(
                        item_id = %item.id(),
                        item_kind = %item.kind(),
                        active_kind = %kind,
                        "refusing to mix media kinds in one queue"
                    );
                    return false;
                }
            }
            if !core.state.queue.push(item) {
                return false;
            }
            core.persist();
        }
        self.events.queue_changed();
        true
    }

    /// Remove the queue entry at `index`; the current index follows its item.
    pub fn dequeue(&self, index: usize) -> bool {
        {
            let mut core = self.lock();
            if core.state.queue.remove(index).is_none() {
                return false;
            }
            core.persist();
        }
        self.events.queue_changed();
        true
    }

    /// Empty the queue without stopping the current item.
    pub fn clear_queue(&self) {
        {
            let mut core = self.lock();
            core.state.queue.clear();
            core.persist();
        }
        self.events.queue_changed();
    }

    /// Apply a signal from the media source.
    pub async fn handle_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataReady { duration } => {
                self.lock().state.on_metadata(duration);
                self.events.state_changed();
            }
            MediaEvent::TimeAdvanced { position } => {
                let position = {
                    let mut core = self.lock();
                    core.state.on_time(position);
                    if core.state.duration == 0.0 {
                        if let Some(duration) = core.source.duration() {
                            core.state.on_metadata(duration);
                        }
                    }
                    core.state.current_time
                };
                self.events.time_changed(position);
            }
            MediaEvent::Ended => {
                tracing::debug!("media ended; advancing queue");
                self.next().await;
            }
            MediaEvent::Error { message } => {
                let item_id = {
                    let mut core = self.lock();
                    core.bump_generation();
                    core.state.on_play_failed(message.clone());
                    core.current_item_id()
                };
                tracing::warn!(item_id = ?item_id, error = %message, "media source error");
                self.events.playback_failed(item_id, message);
                self.events.state_changed();
            }
        }
    }

    async fn settle(&self, pending: PendingPlay) {
        let PendingPlay {
            generation,
            item_id,
            request,
        } = pending;
        let result = request.await;
        let failure = {
            let mut core = self.lock();
            if core.generation != generation {
                tracing::debug!(
                    generation,
                    latest = core.generation,
                    item_id = ?item_id,
                    "ignoring stale play result"
                );
                return;
            }
            match result {
                Ok(()) => {
                    core.state.on_play_started();
                    None
                }
                Err(err) => {
                    let message = err.to_string();
                    core.state.on_play_failed(message.clone());
                    Some(message)
                }
            }
        };
        match failure {
            Some(message) => {
                tracing::warn!(item_id = ?item_id, error = %message, "playback start failed");
                self.events.playback_failed(item_id, message);
            }
            None => tracing::debug!(item_id = ?item_id, "playback started"),
        }
        self.events.state_changed();
    }
}
