//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the handles the request handlers need: the
//! read-only [`QueryService`] and the [`SpikeGenerator`] (for status
//! display only -- lifecycle is owned by the engine binary). It is
//! wrapped in [`Arc`] and injected via Axum's `State` extractor.

use std::sync::Arc;

use spikesim_core::{QueryService, SpikeGenerator};

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Read-only query operations over the spike store.
    pub query: QueryService,
    /// The background generator; handlers only read its status and
    /// configuration, never start or stop it.
    pub generator: Arc<SpikeGenerator>,
}

impl AppState {
    /// Create a new application state.
    pub const fn new(query: QueryService, generator: Arc<SpikeGenerator>) -> Self {
        Self { query, generator }
    }
}
