//! In-process event bus for player updates.
//!
//! Presentation layers subscribe here instead of receiving errors from commands.

use tokio::sync::broadcast;

/// Player event payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Transport or binding state changed; re-read the snapshot.
    StateChanged,
    /// Position update from the media source.
    TimeChanged { position: f64 },
    /// Queue contents or index changed.
    QueueChanged,
    /// A play request or the running resource failed.
    PlaybackFailed { item_id: Option<String>, message: String },
    /// `next` ran past the last queue entry.
    QueueExhausted,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Create a new event bus with a bounded broadcast channel.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.sender.subscribe()
    }

    pub fn state_changed(&self) {
        let _ = self.sender.send(PlayerEvent::StateChanged);
    }

    pub fn time_changed(&self, position: f64) {
        let _ = self.sender.send(PlayerEvent::TimeChanged { position });
    }

    pub fn queue_changed(&self) {
        let _ = self.sender.send(PlayerEvent::QueueChanged);
    }

    pub fn playback_failed(&self, item_id: Option<String>, message: String) {
        let _ = self
            .sender
            .send(PlayerEvent::PlaybackFailed { item_id, message });
    }

    pub fn queue_exhausted(&self) {
        let _ = self.sender.send(PlayerEvent::QueueExhausted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn subscribers_receive_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.queue_changed();
        bus.playback_failed(Some("t-1".to_string()), "blocked".to_string());

        assert_eq!(rx.try_recv().unwrap(), PlayerEvent::QueueChanged);
        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerEvent::PlaybackFailed {
                item_id: Some("t-1".to_string()),
                message: "blocked".to_string(),
            }
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = EventBus::new(1);
        bus.state_changed();
        bus.queue_exhausted();
    }
}
