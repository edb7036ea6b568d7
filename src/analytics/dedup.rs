use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(2000);

/// Suppresses repeats of the same event key inside a fixed window.
///
/// Each key expires `window` after it was first registered. A suppressed
/// repeat does not push the expiry back.
pub struct EventDeduplicator {
    window: Duration,
    /// key -> registered_at
    entries: DashMap<String, Instant>,
}

impl EventDeduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: DashMap::new(),
        }
    }

    pub fn should_suppress(&self, key: &str) -> bool {
        self.should_suppress_at(key, Instant::now())
    }

    /// Returns true if `key` is still live at `now`, otherwise registers it.
    pub fn should_suppress_at(&self, key: &str, now: Instant) -> bool {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) < self.window {
                    true
                } else {
                    entry.insert(now);
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                false
            }
        }
    }

    pub fn evict_expired(&self) {
        self.evict_expired_at(Instant::now());
    }

    pub fn evict_expired_at(&self, now: Instant) {
        let window = self.window;
        self.entries
            .retain(|_, registered| now.duration_since(*registered) < window);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
