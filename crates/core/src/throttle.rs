//! Per-key time-window suppression.
//!
//! A [`KeyedThrottle`] remembers when each key last passed and refuses the
//! key again until `window` has elapsed. It backs the achievement-check
//! debounce (keyed by user) and the error-telemetry dedupe (keyed by
//! fingerprint). The caller supplies `now` so tests can drive the clock.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Remembers the last accepted instant per key.
#[derive(Debug)]
pub struct KeyedThrottle<K> {
    window: Duration,
    last_seen: HashMap<K, Instant>,
}

impl<K: Eq + Hash> KeyedThrottle<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }

    /// Returns `true` and records `now` when `key` has not passed within the
    /// window; returns `false` (and leaves the record untouched) otherwise.
    pub fn try_acquire(&mut self, key: K, now: Instant) -> bool {
        match self.last_seen.get(&key) {
            Some(prev) if now.saturating_duration_since(*prev) < self.window => false,
            _ => {
                self.last_seen.insert(key, now);
                true
            }
        }
    }

    /// Forget `key`, letting the next call through immediately.
    pub fn release(&mut self, key: &K) {
        self.last_seen.remove(key);
    }

    /// Drop entries whose window has expired. Returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.last_seen.len();
        let window = self.window;
        self.last_seen
            .retain(|_, seen| now.saturating_duration_since(*seen) < window);
        before - self.last_seen.len()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
