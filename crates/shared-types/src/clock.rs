//! Wire representation of a vector clock.
//!
//! The live, mutable clock lives in `pocw-vlc`; this crate only carries the
//! serializable snapshot so every other subsystem can embed a copy without
//! depending on the clock's implementation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process identifier within the vector clock. The miner is always `1`;
/// validators occupy `2..`.
pub type ProcessId = u32;

/// A point-in-time copy of a vector clock's state.
///
/// `BTreeMap` keeps serialization deterministic, which matters because
/// `VlcClock` values feed the canonical signing input in `pocw-signing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorClockSnapshot {
    pub process_id: ProcessId,
    pub values: BTreeMap<ProcessId, u64>,
    /// Wall-clock hint only; never used for ordering.
    pub timestamp: i64,
}

impl VectorClockSnapshot {
    pub fn empty(process_id: ProcessId) -> Self {
        Self {
            process_id,
            values: BTreeMap::new(),
            timestamp: 0,
        }
    }

    pub fn get(&self, pid: ProcessId) -> u64 {
        self.values.get(&pid).copied().unwrap_or(0)
    }
}
