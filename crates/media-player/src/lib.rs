//! Unified media player core.
//!
//! One engine drives a single audio resource for either music tracks or podcast
//! episodes, keeps a same-kind queue, and persists enough state to resume after
//! a restart.

pub mod config;
pub mod events;
pub mod persistence;
pub mod player;
pub mod policy;
pub mod queue;
pub mod simulated;
pub mod source;
pub mod state;

pub use media_types::{MediaItem, MediaKind, PlaybackPhase, PlayerSnapshot};
pub use player::PlayerHandle;
