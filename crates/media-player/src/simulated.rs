//! Clock-driven media source for headless use and tests.
//!
//! No audio is produced; `advance` moves a virtual playhead and reports the
//! signals a real resource would emit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::FutureExt;

use crate::source::{MediaError, MediaEvent, MediaSource, PlayRequest};

/// URI prefix the simulated source refuses to play.
pub const INVALID_URI_PREFIX: &str = "invalid:";

#[derive(Debug, Default)]
struct SimState {
    uri: Option<String>,
    playing: bool,
    position: f64,
    volume: f32,
    duration: Option<f64>,
    metadata_sent: bool,
    default_duration: f64,
    durations: HashMap<String, f64>,
}

/// Cloneable handle; clones drive the same virtual resource.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSource {
    /// Every loaded URI lasts `default_duration` seconds unless overridden.
    pub fn new(default_duration: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                volume: 1.0,
                default_duration: default_duration.max(0.0),
                ..SimState::default()
            })),
        }
    }

    pub fn with_duration(self, uri: impl Into<String>, seconds: f64) -> Self {
        self.lock().durations.insert(uri.into(), seconds.max(0.0));
        self
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn loaded_uri(&self) -> Option<String> {
        self.lock().uri.clone()
    }

    /// Move the playhead forward by `dt` seconds of wall time.
    ///
    /// The first tick after a load reports metadata. Reaching the end stops
    /// the resource and reports `Ended`.
    pub fn advance(&self, dt: f64) -> Vec<MediaEvent> {
        let mut state = self.lock();
        let mut events = Vec::new();
        if state.uri.is_none() {
            return events;
        }
        let duration = state.duration.unwrap_or(state.default_duration);
        if !state.metadata_sent {
            state.metadata_sent = true;
            state.duration = Some(duration);
            events.push(MediaEvent::MetadataReady { duration });
        }
        if !state.playing || !dt.is_finite() || dt <= 0.0 {
            return events;
        }
        state.position = (state.position + dt).min(duration);
        events.push(MediaEvent::TimeAdvanced {
            position: state.position,
        });
        if state.position >= duration {
            state.playing = false;
            events.push(MediaEvent::Ended);
        }
        events
    }
}

impl MediaSource for SimulatedSource {
    fn load(&mut self, uri: &str) {
        let mut state = self.lock();
        let duration = state
            .durations
            .get(uri)
            .copied()
            .unwrap_or(state.default_duration);
        state.uri = Some(uri.to_string());
        state.playing = false;
        state.position = 0.0;
        state.duration = Some(duration);
        state.metadata_sent = false;
    }

    fn play(&mut self) -> PlayRequest {
        let mut state = self.lock();
        let result = match state.uri.as_deref() {
            None => Err(MediaError::InvalidUri("no media loaded".to_string())),
            Some(uri) if uri.starts_with(INVALID_URI_PREFIX) => {
                Err(MediaError::InvalidUri(uri.to_string()))
            }
            Some(_) => {
                state.playing = true;
                Ok(())
            }
        };
        futures_util::future::ready(result).boxed()
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn current_time(&self) -> f64 {
        self.lock().position
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.lock();
        let upper = state.duration.unwrap_or(f64::MAX);
        if seconds.is_finite() {
            state.position = seconds.clamp(0.0, upper);
        }
    }

    fn volume(&self) -> f32 {
        self.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().volume = volume;
    }

    fn duration(&self) -> Option<f64> {
        let state = self.lock();
        if state.metadata_sent { state.duration } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plays_loaded_uri_and_rejects_invalid() {
        let mut source = SimulatedSource::new(10.0);
        assert!(source.play().await.is_err());

        source.load("https://cdn/a.mp3");
        assert!(source.play().await.is_ok());
        assert!(source.is_playing());

        source.load("invalid:missing");
        assert_eq!(
            source.play().await,
            Err(MediaError::InvalidUri("invalid:missing".to_string()))
        );
        assert!(!source.is_playing());
    }

    #[tokio::test]
    async fn advance_reports_metadata_progress_and_end() {
        let mut source = SimulatedSource::new(10.0).with_duration("https://cdn/short.mp3", 3.0);
        source.load("https://cdn/short.mp3");
        assert_eq!(
            source.advance(1.0),
            vec![MediaEvent::MetadataReady { duration: 3.0 }]
        );
        assert_eq!(source.duration(), Some(3.0));

        source.play().await.unwrap();
        assert_eq!(
            source.advance(2.0),
            vec![MediaEvent::TimeAdvanced { position: 2.0 }]
        );
        assert_eq!(
            source.advance(5.0),
            vec![MediaEvent::TimeAdvanced { position: 3.0 }, MediaEvent::Ended]
        );
        assert!(!source.is_playing());
        assert!(source.advance(1.0).is_empty());
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let mut source = SimulatedSource::new(60.0);
        source.load("https://cdn/a.mp3");
        source.set_current_time(90.0);
        assert_eq!(source.current_time(), 60.0);
        source.set_current_time(-4.0);
        assert_eq!(source.current_time(), 0.0);
        source.set_volume(0.3);
        assert_eq!(source.volume(), 0.3);
    }

    #[tokio::test]
    async fn drives_player_through_queue_to_the_end() {
        use crate::config::PlayerConfig;
        use crate::persistence::MemoryStore;
        use crate::player::PlayerHandle;
        use media_types::MediaItem;

        let clock = SimulatedSource::new(2.0);
        let player = PlayerHandle::new(
            Box::new(clock.clone()),
            Arc::new(MemoryStore::new()),
            &PlayerConfig::default(),
        );
        let items = vec![
            MediaItem::track("a", "A", "artist", "https://cdn/a.mp3"),
            MediaItem::track("b", "B", "artist", "https://cdn/b.mp3"),
        ];
        assert!(player.play_queue_from(items, 0).await);

        for _ in 0..6 {
            for event in clock.advance(1.0) {
                player.handle_media_event(event).await;
            }
        }

        let snap = player.snapshot();
        assert_eq!(snap.current_index, 1);
        assert_eq!(snap.current_item.as_ref().map(MediaItem::id), Some("b"));
        assert!(!snap.is_playing);
        assert_eq!(snap.current_time, 0.0);
        assert_eq!(clock.loaded_uri().as_deref(), Some("https://cdn/b.mp3"));
    }
}
