//! Miner-side task lifecycle: submission, verification (sync, async-watch,
//! and bounded batch worker pool), proof assembly, and validator fan-out.
//!
//! [`lifecycle::LifecycleEngine`] drives the primary path; [`batch_pool::BatchPool`]
//! and [`scheduler::Scheduler`] handle the bulk and catch-up paths respectively.
//! All three share one [`store::TaskStore`] and one [`pocw_vlc::VlcService`]
//! so the clock only ever advances once per verified event.

pub mod batch_pool;
pub mod cancellation;
pub mod item_verifier;
pub mod lifecycle;
pub mod points;
pub mod scheduler;
pub mod store;

pub use batch_pool::BatchPool;
pub use cancellation::CancelToken;
pub use item_verifier::{ItemVerifier, MiddlewareItemVerifier};
pub use lifecycle::{LifecycleEngine, SubmitTaskRequest, SubmitTaskResponse};
pub use points::{HttpPointsClient, PointsClient};
pub use scheduler::Scheduler;
pub use store::{InMemoryTaskStore, TaskStore};
