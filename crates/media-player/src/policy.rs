//! Queue boundary behavior per media kind.
//!
//! Tracks and episodes share one engine and differ only in what happens when
//! `previous` is pressed on the first entry and when `next` runs off the end.

use media_types::MediaKind;
use serde::Deserialize;

/// What `previous` does when there is no earlier queue entry.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreviousAtStart {
    /// Seek the current item back to 0 and keep the index.
    RestartCurrent,
    /// Do nothing.
    Ignore,
}

/// What `next` does when the queue is exhausted.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueExhausted {
    /// Pause the resource, rewind it to 0 and clear the playing flag.
    PauseAndRewind,
    /// Only clear the playing flag.
    FlagOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPolicy {
    pub previous_at_start: PreviousAtStart,
    pub exhausted: QueueExhausted,
}

impl BoundaryPolicy {
    /// Built-in behavior for a media kind.
    pub fn for_kind(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Track => Self {
                previous_at_start: PreviousAtStart::RestartCurrent,
                exhausted: QueueExhausted::PauseAndRewind,
            },
            MediaKind::Episode => Self {
                previous_at_start: PreviousAtStart::Ignore,
                exhausted: QueueExhausted::FlagOnly,
            },
        }
    }
}

/// Resolved policies for both kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicySet {
    pub track: BoundaryPolicy,
    pub episode: BoundaryPolicy,
}

impl PolicySet {
    pub fn get(&self, kind: MediaKind) -> BoundaryPolicy {
        match kind {
            MediaKind::Track => self.track,
            MediaKind::Episode => self.episode,
        }
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            track: BoundaryPolicy::for_kind(MediaKind::Track),
            episode: BoundaryPolicy::for_kind(MediaKind::Episode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_defaults_restart_and_rewind() {
        let policy = BoundaryPolicy::for_kind(MediaKind::Track);
        assert_eq!(policy.previous_at_start, PreviousAtStart::RestartCurrent);
        assert_eq!(policy.exhausted, QueueExhausted::PauseAndRewind);
    }

    #[test]
    fn episode_defaults_ignore_and_flag_only() {
        let set = PolicySet::default();
        let policy = set.get(MediaKind::Episode);
        assert_eq!(policy.previous_at_start, PreviousAtStart::Ignore);
        assert_eq!(policy.exhausted, QueueExhausted::FlagOnly);
    }
}
