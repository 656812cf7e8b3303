//! Observer API server for the spikesim signal simulator.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for querying the simulated spike stream
//!   (`/signals`, `/stats`) and liveness (`/health`)
//! - **Minimal HTML status page** (`GET /`) showing generator
//!   configuration and links to the API endpoints
//!
//! # Architecture
//!
//! The observer is thin plumbing over the core: every read endpoint
//! delegates to [`spikesim_core::QueryService`], which in turn reads
//! the append-only store the generator writes into. Parameter bounds
//! are enforced here at the boundary; the core assumes pre-validated
//! input (and clamps defensively besides).
//!
//! CORS is wide open for dashboard access and every request is traced.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ObserverError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_observer};
pub use state::AppState;
