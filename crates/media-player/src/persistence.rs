//! Snapshot persistence for the player.
//!
//! The player writes a small JSON document on every binding/queue/volume change
//! and reads it once at construction. Store failures are logged and swallowed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use media_types::{MediaItem, MediaKind};
use serde::{Deserialize, Serialize};

/// Current on-disk layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Key-value store for serialized snapshots.
pub trait SnapshotStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Looks up fresh catalog data for a persisted item on hydration.
pub trait ItemResolver {
    fn resolve(&self, kind: MediaKind, id: &str) -> Option<MediaItem>;
}

/// Persisted subset of player state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedPlayer {
    pub version: u32,
    pub current_item: Option<MediaItem>,
    pub volume: f32,
    #[serde(default)]
    pub queue: Vec<MediaItem>,
    #[serde(default)]
    pub current_index: usize,
}

impl PersistedPlayer {
    /// Swap stored items for catalog versions where the resolver knows them.
    pub fn resolve_with(mut self, resolver: &dyn ItemResolver) -> Self {
        let refresh = |item: MediaItem| -> MediaItem {
            match resolver.resolve(item.kind(), item.id()) {
                Some(fresh) if fresh.kind() == item.kind() && fresh.id() == item.id() => fresh,
                _ => item,
            }
        };
        self.current_item = self.current_item.map(&refresh);
        self.queue = self.queue.into_iter().map(&refresh).collect();
        self
    }
}

/// Read and decode a snapshot. Missing, unreadable, or corrupt data yields `None`.
pub fn load_snapshot(store: &dyn SnapshotStore, key: &str) -> Option<PersistedPlayer> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "snapshot read failed; starting fresh");
            return None;
        }
    };
    let snapshot = match serde_json::from_str::<PersistedPlayer>(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            tracing::warn!(key, error = %err, "snapshot is corrupt; starting fresh");
            return None;
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        tracing::warn!(
            key,
            version = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "snapshot version unsupported; starting fresh"
        );
        return None;
    }
    Some(snapshot)
}

/// Encode and write a snapshot, logging any failure.
pub fn save_snapshot(store: &dyn SnapshotStore, key: &str, snapshot: &PersistedPlayer) {
    let raw = match serde_json::to_string(snapshot) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(key, error = %err, "snapshot encode failed");
            return;
        }
    };
    if let Err(err) = store.set(key, &raw) {
        tracing::warn!(key, error = %err, "snapshot write failed");
    }
}

/// In-memory store, shared by clones of an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl SnapshotStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read snapshot {:?}", path)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create snapshot dir {:?}", self.dir))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("write snapshot {:?}", tmp))?;
        if let Err(err) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err).with_context(|| format!("replace snapshot {:?}", path));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow::anyhow!("storage unavailable"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("quota exceeded"))
        }
    }

    struct Catalog;

    impl ItemResolver for Catalog {
        fn resolve(&self, kind: MediaKind, id: &str) -> Option<MediaItem> {
            match (kind, id) {
                (MediaKind::Track, "t-1") => Some(
                    MediaItem::track("t-1", "Remastered", "artist", "https://cdn/v2/t-1.mp3")
                        .with_duration(200.0),
                ),
                (MediaKind::Track, "t-2") => Some(MediaItem::episode("t-2", "x", "p", "u")),
                _ => None,
            }
        }
    }

    fn sample() -> PersistedPlayer {
        PersistedPlayer {
            version: SNAPSHOT_VERSION,
            current_item: Some(MediaItem::track("t-1", "Song", "artist", "https://cdn/t-1.mp3")),
            volume: 0.3,
            queue: vec![
                MediaItem::track("t-1", "Song", "artist", "https://cdn/t-1.mp3"),
                MediaItem::track("t-2", "Other", "artist", "https://cdn/t-2.mp3"),
            ],
            current_index: 0,
        }
    }

    fn temp_root(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "media-deck-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn save_then_load_round_trips_through_memory_store() {
        let store = MemoryStore::new();
        save_snapshot(&store, "player", &sample());
        assert_eq!(load_snapshot(&store, "player"), Some(sample()));
        assert_eq!(load_snapshot(&store, "other"), None);
    }

    #[test]
    fn corrupt_or_foreign_snapshots_load_as_none() {
        let store = MemoryStore::new();
        store.set("player", "{not json").unwrap();
        assert!(load_snapshot(&store, "player").is_none());

        let mut future = sample();
        future.version = SNAPSHOT_VERSION + 1;
        store
            .set("player", &serde_json::to_string(&future).unwrap())
            .unwrap();
        assert!(load_snapshot(&store, "player").is_none());
    }

    #[test]
    fn store_failures_are_swallowed() {
        save_snapshot(&FailingStore, "player", &sample());
        assert!(load_snapshot(&FailingStore, "player").is_none());
    }

    #[test]
    fn snapshot_excludes_transport_fields() {
        let raw = serde_json::to_value(sample()).unwrap();
        let obj = raw.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["current_index", "current_item", "queue", "version", "volume"]
        );
    }

    #[test]
    fn resolver_refreshes_known_items_only() {
        let snapshot = sample().resolve_with(&Catalog);
        let current = snapshot.current_item.unwrap();
        assert_eq!(current.title(), "Remastered");
        assert_eq!(current.uri(), "https://cdn/v2/t-1.mp3");
        // kind mismatch from the catalog keeps the stored item
        assert_eq!(snapshot.queue[1].title(), "Other");
        assert_eq!(snapshot.queue[1].kind(), MediaKind::Track);
    }

    #[test]
    fn file_store_persists_between_instances() {
        let root = temp_root("file-store");
        let store = FileStore::new(&root);
        assert!(store.get("media-deck.player").unwrap().is_none());

        save_snapshot(&store, "media-deck.player", &sample());
        let reopened = FileStore::new(&root);
        assert_eq!(load_snapshot(&reopened, "media-deck.player"), Some(sample()));
        assert!(root.join("media-deck.player.json").exists());
        assert!(!root.join("media-deck.player.json.tmp").exists());
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let root = temp_root("file-store-replace");
        let blocker = root.join("player.json");
        std::fs::create_dir_all(blocker.join("occupied")).unwrap();
        let store = FileStore::new(&root);

        assert!(store.set("player", "{}").is_err());
        assert!(!root.join("player.json.tmp").exists());
        assert!(blocker.is_dir());
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let root = temp_root("file-store-keys");
        let store = FileStore::new(&root);
        store.set("../escape/key", "{}").unwrap();
        assert!(root.join(".._escape_key.json").exists());
        assert_eq!(store.get("../escape/key").unwrap().as_deref(), Some("{}"));
    }
}
