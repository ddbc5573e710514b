//! Per-task-type, per-stage increment strategy.
//!
//! A pure function of `(task_type, stage, payload)`. It never touches a
//! clock directly — it only advises `VlcService` how many local increments
//! an event is worth, if any.

use shared_types::entities::TaskType;

/// Point in a task's lifecycle at which the strategy may be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Submission,
    Verification,
}

/// Caps the clock advance a single batch verification can cause.
const MAX_BATCH_INCREMENT: u64 = 10;

/// Returns the number of local increments an event is worth, or `0` for a
/// no-op. `verified_count` is the number of items that came back verified
/// in a batch task; ignored for the other task types. A batch with zero
/// verified items causes no advance — there is no confirmed event to
/// attest to.
pub fn increment_amount(task_type: TaskType, stage: Stage, verified_count: usize) -> u64 {
    match (task_type, stage) {
        (TaskType::Creation, Stage::Submission) => 1,
        (TaskType::Creation, Stage::Verification) => 0,
        (TaskType::Retweet, Stage::Submission) => 0,
        (TaskType::Retweet, Stage::Verification) => 1,
        (TaskType::Batch, Stage::Submission) => 0,
        (TaskType::Batch, Stage::Verification) => {
            (verified_count as u64).min(MAX_BATCH_INCREMENT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_advances_only_on_submission() {
        assert_eq!(increment_amount(TaskType::Creation, Stage::Submission, 0), 1);
        assert_eq!(increment_amount(TaskType::Creation, Stage::Verification, 0), 0);
    }

    #[test]
    fn retweet_advances_only_on_verification() {
        assert_eq!(increment_amount(TaskType::Retweet, Stage::Submission, 0), 0);
        assert_eq!(increment_amount(TaskType::Retweet, Stage::Verification, 0), 1);
    }

    #[test]
    fn batch_clamps_to_ten() {
        assert_eq!(increment_amount(TaskType::Batch, Stage::Verification, 25), 10);
        assert_eq!(increment_amount(TaskType::Batch, Stage::Verification, 3), 3);
        assert_eq!(increment_amount(TaskType::Batch, Stage::Verification, 0), 0);
    }
}
