//! Shared type definitions for the spikesim signal simulator.
//!
//! This crate holds the types every other crate speaks: typed
//! identifiers, the [`SpikeEvent`] entity, the [`NewSpike`] insert
//! record, and the aggregation result shapes served by the HTTP API.
//!
//! # Modules
//!
//! - [`ids`] -- newtype identifier wrappers
//! - [`events`] -- spike records and windowed statistics

pub mod events;
pub mod ids;

// Re-export primary types for convenience.
pub use events::{NeuronStats, NewSpike, SpikeEvent, WindowedStats};
pub use ids::{NeuronId, SpikeId};
