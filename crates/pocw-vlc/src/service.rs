//! Wraps a `VectorClock` behind a single-writer-many-readers service and
//! layers on the bounded event log and validator-side causality check.

use crate::clock::{compare_snapshots, Ordering, VectorClock};
use crate::strategy::{increment_amount, Stage};
use parking_lot::RwLock;
use shared_types::clock::{ProcessId, VectorClockSnapshot};
use shared_types::entities::TaskType;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use uuid::Uuid;

/// A single recorded clock-advancing event, retained for diagnostics.
#[derive(Debug, Clone)]
pub struct ClockEvent {
    pub task_id: Uuid,
    pub task_type: TaskType,
    pub stage: Stage,
    pub amount: u64,
    pub resulting_value: u64,
}

/// Oldest events are discarded once the log exceeds this size.
const EVENT_LOG_CAPACITY: usize = 1000;

/// Miner-side (or any single-owner) VLC service.
///
/// All increments serialize through the inner lock; readers receive owned
/// snapshots, never a live reference into the clock.
pub struct VlcService {
    clock: RwLock<VectorClock>,
    events: RwLock<VecDeque<ClockEvent>>,
}

impl VlcService {
    pub fn new(process_id: ProcessId) -> Arc<Self> {
        Arc::new(Self {
            clock: RwLock::new(VectorClock::new(process_id)),
            events: RwLock::new(VecDeque::new()),
        })
    }

    /// Consults the strategy for `(task_type, stage)`; if it calls for an
    /// advance, increments the clock that many times atomically and
    /// records one event carrying the final value. Returns the resulting
    /// snapshot regardless of whether an increment happened.
    pub fn increment_for_task(
        &self,
        task_id: Uuid,
        task_type: TaskType,
        stage: Stage,
        verified_count: usize,
    ) -> VectorClockSnapshot {
        let _span = tracing::debug_span!("vlc_increment", %task_id, ?task_type, ?stage).entered();
        let amount = increment_amount(task_type, stage, verified_count);

        let mut clock = self.clock.write();
        let mut resulting_value = clock.get(clock.process_id());
        for _ in 0..amount {
            resulting_value = clock.increment();
        }
        let snapshot = clock.snapshot(now_unix());
        drop(clock);

        if amount > 0 {
            tracing::debug!(amount, resulting_value, "clock advanced");
            let mut events = self.events.write();
            events.push_back(ClockEvent {
                task_id,
                task_type,
                stage,
                amount,
                resulting_value,
            });
            if events.len() > EVENT_LOG_CAPACITY {
                events.pop_front();
            }
        }

        snapshot
    }

    pub fn current_clock(&self) -> VectorClockSnapshot {
        self.clock.read().snapshot(now_unix())
    }

    pub fn event_log_len(&self) -> usize {
        self.events.read().len()
    }
}

/// Validator-side wrapper: tracks the validator's own clock plus a mirror
/// of the most recently observed miner clock, used for the causality check.
pub struct ValidatorVlcService {
    own: VlcService,
    mirror: RwLock<BTreeMap<ProcessId, u64>>,
}

impl ValidatorVlcService {
    pub fn new(process_id: ProcessId) -> Arc<Self> {
        Arc::new(Self {
            own: VectorClock::new(process_id).into(),
            mirror: RwLock::new(BTreeMap::new()),
        })
    }

    /// Replaces the mirror with `vlc`'s components, taking the point-wise
    /// maximum so a late or reordered message can't roll the mirror back.
    pub fn update_miner(&self, vlc: &VectorClockSnapshot) {
        let mut mirror = self.mirror.write();
        for (&pid, &value) in &vlc.values {
            let entry = mirror.entry(pid).or_insert(0);
            if value > *entry {
                *entry = value;
            }
        }
    }

    /// Causality check: the miner's component for `miner_pid` must have
    /// strictly advanced past the mirror, and no other tracked component
    /// may have regressed.
    pub fn validate_sequence(&self, miner_vlc: &VectorClockSnapshot, miner_pid: ProcessId) -> bool {
        let mirror = self.mirror.read();
        let mirror_miner = mirror.get(&miner_pid).copied().unwrap_or(0);
        if miner_vlc.get(miner_pid) <= mirror_miner {
            return false;
        }

        for (&pid, &mirrored_value) in mirror.iter() {
            if pid == miner_pid {
                continue;
            }
            if miner_vlc.get(pid) < mirrored_value {
                return false;
            }
        }

        true
    }

    pub fn current_clock(&self) -> VectorClockSnapshot {
        self.own.current_clock()
    }

    pub fn mirror_snapshot(&self, miner_pid: ProcessId) -> VectorClockSnapshot {
        let mirror = self.mirror.read();
        VectorClockSnapshot {
            process_id: miner_pid,
            values: mirror.clone(),
            timestamp: now_unix(),
        }
    }
}

impl From<VectorClock> for VlcService {
    fn from(clock: VectorClock) -> Self {
        Self {
            clock: RwLock::new(clock),
            events: RwLock::new(VecDeque::new()),
        }
    }
}

/// Compares two already-produced snapshots, exposed here so callers that
/// hold snapshots (not a live service) can still check ordering.
pub fn compare(a: &VectorClockSnapshot, b: &VectorClockSnapshot) -> Ordering {
    compare_snapshots(a, b)
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_submission_advances_by_one() {
        let service = VlcService::new(1);
        let snapshot =
            service.increment_for_task(Uuid::new_v4(), TaskType::Creation, Stage::Submission, 0);
        assert_eq!(snapshot.get(1), 1);
        assert_eq!(service.event_log_len(), 1);
    }

    #[test]
    fn creation_verification_does_not_advance() {
        let service = VlcService::new(1);
        service.increment_for_task(Uuid::new_v4(), TaskType::Creation, Stage::Submission, 0);
        let snapshot =
            service.increment_for_task(Uuid::new_v4(), TaskType::Creation, Stage::Verification, 0);
        assert_eq!(snapshot.get(1), 1);
        assert_eq!(service.event_log_len(), 1);
    }

    #[test]
    fn batch_verification_clamps_to_ten() {
        let service = VlcService::new(1);
        let snapshot =
            service.increment_for_task(Uuid::new_v4(), TaskType::Batch, Stage::Verification, 25);
        assert_eq!(snapshot.get(1), 10);
    }

    #[test]
    fn event_log_is_bounded() {
        let service = VlcService::new(1);
        for _ in 0..(EVENT_LOG_CAPACITY + 10) {
            service.increment_for_task(Uuid::new_v4(), TaskType::Creation, Stage::Submission, 0);
        }
        assert_eq!(service.event_log_len(), EVENT_LOG_CAPACITY);
    }

    #[test]
    fn validator_rejects_non_advancing_miner_clock() {
        let validator = ValidatorVlcService::new(2);
        let mut seen = VectorClockSnapshot::empty(1);
        seen.values.insert(1, 5);
        validator.update_miner(&seen);

        let mut replay = VectorClockSnapshot::empty(1);
        replay.values.insert(1, 5);
        assert!(!validator.validate_sequence(&replay, 1));

        let mut advanced = VectorClockSnapshot::empty(1);
        advanced.values.insert(1, 6);
        assert!(validator.validate_sequence(&advanced, 1));
    }

    #[test]
    fn validator_rejects_regression_on_other_components() {
        let validator = ValidatorVlcService::new(2);
        let mut seen = VectorClockSnapshot::empty(1);
        seen.values.insert(1, 5);
        seen.values.insert(3, 8);
        validator.update_miner(&seen);

        let mut regressed = VectorClockSnapshot::empty(1);
        regressed.values.insert(1, 6);
        regressed.values.insert(3, 2);
        assert!(!validator.validate_sequence(&regressed, 1));
    }
}
