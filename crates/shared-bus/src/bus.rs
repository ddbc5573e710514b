//! In-memory event bus for intra-miner choreography.
//!
//! Built on `tokio::sync::broadcast`: cheap multi-producer/multi-consumer
//! fan-out within a single process. Lagging subscribers simply miss old
//! events rather than blocking producers, which is acceptable here since the
//! bus carries observability/coordination signals, not the task data of
//! record (that lives in the `TaskStore`).

use crate::events::MinerEvent;
use tokio::sync::broadcast;

/// Default number of buffered events per subscriber before old ones are
/// dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Publish side of the bus.
pub struct EventBus {
    sender: broadcast::Sender<MinerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Returns the number of live subscribers it reached.
    pub fn publish(&self, event: MinerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MinerEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let task_id = Uuid::new_v4();

        bus.publish(MinerEvent::TaskSubmitted { task_id });

        let received = rx.recv().await.unwrap();
        matches!(received, MinerEvent::TaskSubmitted { task_id: t } if t == task_id);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::new();
        let reached = bus.publish(MinerEvent::TaskVerified { task_id: Uuid::new_v4() });
        assert_eq!(reached, 0);
    }
}
