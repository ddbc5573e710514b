//! # Shared Types Crate
//!
//! Core domain entities, the VLC clock snapshot, wire envelopes exchanged
//! between the Miner and Validator processes, and the error types shared
//! across PoCW subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-crate types are defined here.
//! - **No Redundant Identity**: a `Task`'s `event_id` is assigned exactly once,
//!   when a `MinerOutput` is built from it, and carried unchanged from then on.

pub mod clock;
pub mod entities;
pub mod errors;
pub mod ipc;

pub use clock::VectorClockSnapshot;
pub use entities::*;
pub use errors::*;
pub use ipc::*;
