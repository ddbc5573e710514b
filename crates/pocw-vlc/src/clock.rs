//! The mutable vector clock owned by a single process (miner or validator).

use shared_types::clock::{ProcessId, VectorClockSnapshot};
use std::collections::BTreeMap;

/// How one clock's state relates to another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Before,
    After,
    Concurrent,
    Equal,
}

/// A process-local vector clock.
///
/// Mutated only through `increment` (a local event) or `merge` (on message
/// receipt). Callers never get a live reference to `values` — `snapshot`
/// hands back an owned copy so readers can't observe a torn write.
#[derive(Debug, Clone)]
pub struct VectorClock {
    process_id: ProcessId,
    values: BTreeMap<ProcessId, u64>,
}

impl VectorClock {
    pub fn new(process_id: ProcessId) -> Self {
        Self {
            process_id,
            values: BTreeMap::new(),
        }
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    /// Post-increments this process's own component and returns the new value.
    pub fn increment(&mut self) -> u64 {
        let entry = self.values.entry(self.process_id).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Point-wise maximum against `other`, followed by a local `increment`.
    pub fn merge(&mut self, other: &VectorClockSnapshot) {
        for (&pid, &value) in &other.values {
            let entry = self.values.entry(pid).or_insert(0);
            if value > *entry {
                *entry = value;
            }
        }
        self.increment();
    }

    pub fn get(&self, pid: ProcessId) -> u64 {
        self.values.get(&pid).copied().unwrap_or(0)
    }

    /// Owned copy for callers that need to hold a point-in-time view.
    pub fn snapshot(&self, timestamp: i64) -> VectorClockSnapshot {
        VectorClockSnapshot {
            process_id: self.process_id,
            values: self.values.clone(),
            timestamp,
        }
    }

    pub fn compare(&self, other: &VectorClockSnapshot) -> Ordering {
        compare_snapshots(&self.snapshot(0), other)
    }
}

/// Compares two snapshots without requiring a live `VectorClock`.
///
/// `Before` iff every component of `a` is `<=` the matching component of
/// `b` and at least one is strictly less; `After` symmetrically. Two empty
/// clocks compare `Equal`. Anything else is `Concurrent`.
pub fn compare_snapshots(a: &VectorClockSnapshot, b: &VectorClockSnapshot) -> Ordering {
    let mut pids: std::collections::BTreeSet<ProcessId> = a.values.keys().copied().collect();
    pids.extend(b.values.keys().copied());

    if pids.is_empty() {
        return Ordering::Equal;
    }

    let mut a_less = false;
    let mut a_greater = false;

    for pid in pids {
        let av = a.get(pid);
        let bv = b.get(pid);
        match av.cmp(&bv) {
            std::cmp::Ordering::Less => a_less = true,
            std::cmp::Ordering::Greater => a_greater = true,
            std::cmp::Ordering::Equal => {}
        }
    }

    match (a_less, a_greater) {
        (true, false) => Ordering::Before,
        (false, true) => Ordering::After,
        (false, false) => Ordering::Equal,
        (true, true) => Ordering::Concurrent,
    }
}
