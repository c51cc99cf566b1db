//! Media source abstraction driven by the player.
//!
//! Implementations wrap one audio resource (an HTML audio element, a native
//! output pipeline, a simulated clock). Resource signals are fed back into the
//! player as [`MediaEvent`] values.

use futures_util::future::BoxFuture;

/// Pending result of a play request; resolves once the resource starts or refuses.
pub type PlayRequest = BoxFuture<'static, Result<(), MediaError>>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MediaError {
    /// Playback refused by the host (autoplay policy, missing user gesture).
    #[error("playback not allowed: {0}")]
    NotAllowed(String),
    /// The URI could not be resolved or is not playable.
    #[error("invalid media uri: {0}")]
    InvalidUri(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    /// The request was superseded by a newer load.
    #[error("playback aborted: {0}")]
    Aborted(String),
}

/// Signals emitted by a media source.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known after a load.
    MetadataReady { duration: f64 },
    /// Periodic position update.
    TimeAdvanced { position: f64 },
    /// Playback reached the end naturally.
    Ended,
    /// Run-time resource failure (decode error, dropped stream).
    Error { message: String },
}

pub trait MediaSource: Send {
    /// Bind a new URI; position resets to 0 and duration becomes unknown.
    fn load(&mut self, uri: &str);
    fn play(&mut self) -> PlayRequest;
    fn pause(&mut self);
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    /// Known duration in seconds, `None` until metadata is available.
    fn duration(&self) -> Option<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_error_messages_include_detail() {
        let err = MediaError::NotAllowed("autoplay blocked".to_string());
        assert_eq!(err.to_string(), "playback not allowed: autoplay blocked");
        let err = MediaError::InvalidUri("invalid:x".to_string());
        assert_eq!(err.to_string(), "invalid media uri: invalid:x");
    }
}
