//! Role-dispatched validator service: replay/time-window guards, miner
//! signature verification against a static key store, VLC causality
//! checking, quality plugin scoring, and signed vote emission.

pub mod errors;
pub mod keys;
pub mod quality;
pub mod service;

pub use errors::ValidationError;
pub use keys::MinerKeyStore;
pub use quality::{QualityAssessment, QualityPlugin, TwitterQualityPlugin};
pub use service::ValidatorService;
