//! Points-distribution dispatch. Out of scope beyond its interface — only
//! the wire shape and failure-isolation behavior matter here.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shared_types::entities::{Task, TaskType};
use shared_types::errors::PocwError;
use uuid::Uuid;

#[derive(Serialize)]
struct PointsTaskEntry {
    task_id: Uuid,
    user_wallet: String,
    task_type: TaskType,
}

#[derive(Serialize)]
struct PointsDispatchRequest {
    batch_id: String,
    trigger_type: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    tasks: Vec<PointsTaskEntry>,
}

#[async_trait]
pub trait PointsClient: Send + Sync {
    /// Dispatches a points-distribution request for the given tasks. The
    /// wallet and task type come from each task's own store record, never
    /// a placeholder — callers must source `tasks` from the `TaskStore`.
    async fn dispatch(&self, batch_id: &str, trigger_type: &str, tasks: &[Task]) -> Result<(), PocwError>;
}

pub struct HttpPointsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPointsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PointsClient for HttpPointsClient {
    async fn dispatch(&self, batch_id: &str, trigger_type: &str, tasks: &[Task]) -> Result<(), PocwError> {
        let request = PointsDispatchRequest {
            batch_id: batch_id.to_string(),
            trigger_type: trigger_type.to_string(),
            timestamp: chrono::Utc::now(),
            tasks: tasks
                .iter()
                .map(|t| PointsTaskEntry {
                    task_id: t.id,
                    user_wallet: t.user_wallet.clone(),
                    task_type: t.task_type,
                })
                .collect(),
        };

        let url = format!("{}/api/v1/points/distribute", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PocwError::TransientUpstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PocwError::PermanentUpstream(format!(
                "points dispatch returned {}",
                response.status()
            )));
        }

        let _body: Value = response
            .json()
            .await
            .map_err(|e| PocwError::Internal(e.to_string()))?;
        Ok(())
    }
}
