//! Process wiring for the PoCW network's two binaries.
//!
//! `pocw-miner-node` and `pocw-validator-node` each load their own
//! [`config`], build the crates that make up their half of the pipeline,
//! and run until `Ctrl+C`. This crate owns none of the pipeline logic
//! itself, only the environment-variable boundary and the construction
//! order.

pub mod config;
pub mod validator_http;
