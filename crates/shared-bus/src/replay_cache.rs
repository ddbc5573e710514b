//! # Time-Bounded Replay Cache
//!
//! Bounds the validator's "already processed this event" set so it cannot
//! grow without limit.
//!
//! ## Design
//!
//! - An `event_id` is valid for `validity_window_secs` after it is first seen.
//! - Garbage collection runs opportunistically, at most once per
//!   `gc_interval_secs`, rather than on a background timer.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from replay cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The event has already been processed (replay attack or duplicate submission).
    #[error("event {event_id} already processed")]
    AlreadyProcessed { event_id: String },
}

/// Time-bounded cache used by the validator service to reject replayed
/// `MinerOutput`s.
///
/// The validity window must cover the miner-clock time-window guard
/// (`[-5min, +1min]` of request timestamp) plus the 10-minute async poll
/// deadline, so an event that legitimately resurfaces after a miner's own
/// retry is not rejected while still bounding memory.
pub struct ReplayCache {
    seen: HashMap<String, u64>,
    validity_window_secs: u64,
    last_gc: u64,
    gc_interval_secs: u64,
}

impl ReplayCache {
    /// Default validity window: covers the 10-minute async poll deadline
    /// plus the 6-minute timestamp guard window with headroom.
    pub const DEFAULT_VALIDITY_WINDOW: u64 = 16 * 60;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 30;

    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_VALIDITY_WINDOW, Self::DEFAULT_GC_INTERVAL)
    }

    pub fn with_config(validity_window_secs: u64, gc_interval_secs: u64) -> Self {
        Self {
            seen: HashMap::new(),
            validity_window_secs,
            last_gc: Self::current_timestamp(),
            gc_interval_secs,
        }
    }

    /// Record `event_id` as processed, rejecting it if already seen.
    pub fn check_and_insert(&mut self, event_id: &str) -> Result<(), ReplayError> {
        let now = Self::current_timestamp();

        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if self.seen.contains_key(event_id) {
            return Err(ReplayError::AlreadyProcessed {
                event_id: event_id.to_string(),
            });
        }

        self.seen.insert(event_id.to_string(), now);
        Ok(())
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.seen.contains_key(event_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn garbage_collect(&mut self, now: u64) {
        let expiry_threshold = now.saturating_sub(self.validity_window_secs);
        self.seen.retain(|_, &mut ts| ts > expiry_threshold);
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl Default for ReplayCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_is_accepted() {
        let mut cache = ReplayCache::new();
        assert!(cache.check_and_insert("task_abc_1000").is_ok());
        assert!(cache.contains("task_abc_1000"));
    }

    #[test]
    fn duplicate_is_rejected() {
        let mut cache = ReplayCache::new();
        cache.check_and_insert("task_abc_1000").unwrap();
        let result = cache.check_and_insert("task_abc_1000");
        assert!(matches!(result, Err(ReplayError::AlreadyProcessed { .. })));
    }

    #[test]
    fn expired_entries_are_collected() {
        let mut cache = ReplayCache::with_config(0, 0);
        cache.check_and_insert("task_abc_1000").unwrap();
        // gc_interval_secs=0 forces a collection pass on the very next call,
        // and validity_window_secs=0 means everything already seen expires.
        assert!(cache.check_and_insert("task_def_1000").is_ok());
        assert!(!cache.contains("task_abc_1000"));
    }

    #[test]
    fn len_tracks_live_entries() {
        let mut cache = ReplayCache::new();
        assert!(cache.is_empty());
        for i in 0..5 {
            cache
                .check_and_insert(&format!("task_{i}_1000"))
                .unwrap();
        }
        assert_eq!(cache.len(), 5);
    }
}
