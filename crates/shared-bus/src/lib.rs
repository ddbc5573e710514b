//! # Shared Bus
//!
//! The in-process event bus used for choreography between miner
//! subsystems, and the time-bounded replay cache used by validators to
//! reject duplicate `MinerOutput`s.
//!
//! Direct calls between the lifecycle engine, batch pool, and scheduler are
//! discouraged in favor of publishing on this bus: it keeps the three
//! independently testable.

pub mod bus;
pub mod events;
pub mod replay_cache;

pub use bus::EventBus;
pub use events::MinerEvent;
pub use replay_cache::{ReplayCache, ReplayError};
