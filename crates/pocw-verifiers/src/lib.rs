//! Pluggable per-task-type verification strategies.
//!
//! [`VerifierPlugin`] is the contract; [`CreationVerifier`],
//! [`RetweetVerifier`], and [`BatchVerifier`] are the three task-type
//! implementations; [`VerifierRegistry`] maps a task type to its plugin.

pub mod batch;
pub mod creation;
pub mod middleware;
pub mod port;
pub mod registry;
pub mod retweet;

pub use batch::{BatchItemResult, BatchVerifier};
pub use creation::CreationVerifier;
pub use middleware::MiddlewareClient;
pub use port::{AsyncStatus, SyncVerification, VerifierPlugin};
pub use registry::VerifierRegistry;
pub use retweet::RetweetVerifier;
