//! Vector logical clock and its per-task-type increment strategy.
//!
//! [`VectorClock`] is the owned, mutable clock a single process holds.
//! [`VlcService`] wraps one behind a lock and a bounded event log for the
//! miner side; [`ValidatorVlcService`] adds the miner-clock mirror and
//! causality check validators run before accepting a `MinerOutput`.

pub mod clock;
pub mod service;
pub mod strategy;

pub use clock::{compare_snapshots, Ordering, VectorClock};
pub use service::{ClockEvent, ValidatorVlcService, VlcService};
pub use strategy::{increment_amount, Stage};
