//! Simulation core for spikesim.
//!
//! This crate owns the two operations the HTTP layer calls into --
//! "fetch recent events" and "compute windowed statistics" -- plus the
//! background generator that produces the synthetic spike stream they
//! read.
//!
//! # Modules
//!
//! - [`config`] -- typed YAML configuration with env overrides
//! - [`generator`] -- the background spike generation loop
//! - [`query`] -- read-only windowed queries over the store

pub mod config;
pub mod generator;
pub mod query;

// Re-export primary types for convenience.
pub use config::{ConfigError, DatabaseConfig, GeneratorConfig, HttpConfig, SimConfig};
pub use generator::{GeneratorError, SpikeGenerator, StopOutcome};
pub use query::QueryService;
