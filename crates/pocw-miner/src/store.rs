//! The task store port and its in-memory adapter.
//!
//! The lifecycle engine is the exclusive owner of a `Task`; the batch
//! pool and scheduler hold only a transient reference while processing.
//! Status transitions are guarded by the caller's expected current status
//! so a race between the scheduler and the primary path can't double-fire
//! a verification.

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::entities::{Task, TaskStatus, TaskType};
use shared_types::errors::PocwError;
use uuid::Uuid;

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<(), PocwError>;
    async fn get(&self, id: Uuid) -> Result<Option<Task>, PocwError>;
    async fn replace(&self, task: Task) -> Result<(), PocwError>;

    /// Atomically moves `id` from `expected` to `new_status`, returning
    /// `false` (not an error) if the current status didn't match —
    /// exactly the compare-and-set guard the scheduler/primary-path race
    /// requires.
    async fn transition(
        &self,
        id: Uuid,
        expected: TaskStatus,
        new_status: TaskStatus,
    ) -> Result<bool, PocwError>;

    async fn list_by_status(
        &self,
        task_type: TaskType,
        status: TaskStatus,
        limit: usize,
    ) -> Result<Vec<Task>, PocwError>;
}

/// `DashMap`-backed in-memory store. Lossy on crash, matching the
/// reference design's in-memory-queue non-goal around durability.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<Uuid, Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: Task) -> Result<(), PocwError> {
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Task>, PocwError> {
        Ok(self.tasks.get(&id).map(|entry| entry.clone()))
    }

    async fn replace(&self, task: Task) -> Result<(), PocwError> {
        self.tasks.insert(task.id, task);
        Ok(())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: TaskStatus,
        new_status: TaskStatus,
    ) -> Result<bool, PocwError> {
        match self.tasks.get_mut(&id) {
            Some(mut entry) if entry.status == expected => {
                entry.status = new_status;
                entry.updated_at = chrono::Utc::now();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(PocwError::Internal(format!("task {id} not found"))),
        }
    }

    async fn list_by_status(
        &self,
        task_type: TaskType,
        status: TaskStatus,
        limit: usize,
    ) -> Result<Vec<Task>, PocwError> {
        Ok(self
            .tasks
            .iter()
            .filter(|entry| entry.task_type == task_type && entry.status == status)
            .take(limit)
            .map(|entry| entry.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_types::clock::VectorClockSnapshot;

    fn sample_task() -> Task {
        Task::new(
            "wallet1".to_string(),
            TaskType::Creation,
            json!({}),
            VectorClockSnapshot::empty(1),
        )
    }

    #[tokio::test]
    async fn transition_guards_on_expected_status() {
        let store = InMemoryTaskStore::new();
        let task = sample_task();
        let id = task.id;
        store.insert(task).await.unwrap();

        assert!(store
            .transition(id, TaskStatus::Submitted, TaskStatus::Processing)
            .await
            .unwrap());

        // Second racer expecting the stale status is refused, not erred.
        assert!(!store
            .transition(id, TaskStatus::Submitted, TaskStatus::Processing)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn list_by_status_filters_correctly() {
        let store = InMemoryTaskStore::new();
        store.insert(sample_task()).await.unwrap();

        let found = store
            .list_by_status(TaskType::Creation, TaskStatus::Submitted, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        let empty = store
            .list_by_status(TaskType::Batch, TaskStatus::Submitted, 10)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
