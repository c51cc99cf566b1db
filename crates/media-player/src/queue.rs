//! Queue storage and index bookkeeping.
//!
//! Owns the ordered list of same-kind items and the index of the current entry.
//! It never talks to the media source; the player decides what to play.

use media_types::{MediaItem, MediaKind};

/// Ordered, same-kind queue with the position of the current entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaQueue {
    items: Vec<MediaItem>,
    current_index: usize,
    /// The current entry was removed; `current_index` is the gap it left, so
    /// the entry now at that position is the next one to play.
    detached: bool,
}

/// Return the shared kind of `items`, or `None` when empty or mixed.
pub fn uniform_kind(items: &[MediaItem]) -> Option<MediaKind> {
    let kind = items.first()?.kind();
    items.iter().all(|item| item.kind() == kind).then_some(kind)
}

impl MediaQueue {
    /// Build a queue from restored parts, clamping the index into range.
    pub fn from_parts(items: Vec<MediaItem>, current_index: usize) -> Self {
        let current_index = if items.is_empty() {
            0
        } else {
            current_index.min(items.len() - 1)
        };
        Self {
            items,
            current_index,
            detached: false,
        }
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Index of the current entry, clamped into range.
    ///
    /// After the current entry is removed this names the entry that followed
    /// it, or the last entry when nothing followed.
    pub fn current_index(&self) -> usize {
        self.current_index.min(self.items.len().saturating_sub(1))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Kind of the queued items, if any are queued.
    pub fn kind(&self) -> Option<MediaKind> {
        self.items.first().map(MediaItem::kind)
    }

    pub fn has_next(&self) -> bool {
        if self.detached {
            self.current_index < self.items.len()
        } else {
            self.current_index + 1 < self.items.len()
        }
    }

    pub fn has_previous(&self) -> bool {
        !self.items.is_empty() && self.current_index > 0
    }

    /// Replace the queue and point at `start_index`.
    ///
    /// Rejects empty, mixed-kind, and out-of-range inputs without mutating.
    pub fn replace(&mut self, items: Vec<MediaItem>, start_index: usize) -> Option<&MediaItem> {
        uniform_kind(&items)?;
        if start_index >= items.len() {
            return None;
        }
        self.items = items;
        self.current_index = start_index;
        self.detached = false;
        self.items.get(start_index)
    }

    /// Append an item; returns `false` when its kind differs from the queue.
    pub fn push(&mut self, item: MediaItem) -> bool {
        if self.kind().is_some_and(|kind| kind != item.kind()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the entry at `index`, keeping the position of the current item.
    ///
    /// Removing the current entry detaches the queue from it: `advance` then
    /// yields the entry that followed it and `retreat` the one before it.
    pub fn remove(&mut self, index: usize) -> Option<MediaItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        if index < self.current_index {
            self.current_index -= 1;
        } else if index == self.current_index && !self.detached {
            self.detached = true;
        }
        if self.items.is_empty() {
            self.current_index = 0;
            self.detached = false;
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.current_index = 0;
        self.detached = false;
    }

    /// Move to the next entry and return it, or `None` when exhausted.
    pub fn advance(&mut self) -> Option<MediaItem> {
        if !self.has_next() {
            return None;
        }
        if self.detached {
            self.detached = false;
        } else {
            self.current_index += 1;
        }
        self.items.get(self.current_index).cloned()
    }

    /// Move to the previous entry and return it, or `None` at the start.
    pub fn retreat(&mut self) -> Option<MediaItem> {
        if !self.has_previous() {
            return None;
        }
        self.current_index -= 1;
        self.detached = false;
        self.items.get(self.current_index).cloned()
    }
}
