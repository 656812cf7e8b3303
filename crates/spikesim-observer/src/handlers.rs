//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read through the [`QueryService`](spikesim_core::QueryService)
//! in the shared [`AppState`]. Parameter bounds are enforced here,
//! before anything reaches the core.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/signals` | Recent spike events, newest first |
//! | `GET` | `/stats` | Per-neuron windowed statistics |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use spikesim_core::query::{
    DEFAULT_LIMIT, DEFAULT_SINCE_SECONDS, DEFAULT_WINDOW_SECONDS, MAX_LIMIT, MAX_SINCE_SECONDS,
    MAX_WINDOW_SECONDS, MIN_LIMIT, MIN_SINCE_SECONDS, MIN_WINDOW_SECONDS,
};
use spikesim_types::NeuronId;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /signals` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct SignalsQuery {
    /// Maximum number of events to return (1..=5000, default 200).
    pub limit: Option<u32>,
    /// Restrict results to a single neuron.
    pub neuron_id: Option<u32>,
    /// Trailing window in seconds (1..=3600, default 60).
    pub since_seconds: Option<u32>,
}

/// Query parameters for the `GET /stats` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct StatsQuery {
    /// Trailing window in seconds (5..=3600, default 60).
    pub window_seconds: Option<u32>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing generator status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.generator.config();
    let neuron_count = config.neuron_count;
    let rate = config.rate_per_second;
    let status = if state.generator.is_running().await {
        "GENERATING"
    } else {
        "IDLE"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Spikesim Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Spikesim Observer</h1>
    <p class="subtitle">Neural spike stream simulator</p>

    <p>Status: <span class="status">{status}</span></p>

    <div>
        <div class="metric">
            <div class="label">Neurons</div>
            <div class="value">{neuron_count}</div>
        </div>
        <div class="metric">
            <div class="label">Spikes / s</div>
            <div class="value">{rate}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/signals">/signals</a> -- Recent spike events (?limit=N&amp;neuron_id=N&amp;since_seconds=N)</li>
        <li><a href="/stats">/stats</a> -- Per-neuron windowed statistics (?window_seconds=N)</li>
        <li><a href="/health">/health</a> -- Liveness probe</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /health -- liveness probe
// ---------------------------------------------------------------------------

/// Report process liveness. Always succeeds while the process is up.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// GET /signals -- recent spike events
// ---------------------------------------------------------------------------

/// Return recent spike events, newest first.
///
/// # Query Parameters
///
/// - `limit`: 1..=5000 (default 200)
/// - `neuron_id`: restrict to one neuron (must be >= 1)
/// - `since_seconds`: 1..=3600 (default 60)
pub async fn get_signals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SignalsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let limit = validate_range(
        "limit",
        params.limit.unwrap_or(DEFAULT_LIMIT),
        MIN_LIMIT,
        MAX_LIMIT,
    )?;
    let since_seconds = validate_range(
        "since_seconds",
        params.since_seconds.unwrap_or(DEFAULT_SINCE_SECONDS),
        MIN_SINCE_SECONDS,
        MAX_SINCE_SECONDS,
    )?;
    let neuron = params
        .neuron_id
        .map(|id| validate_range("neuron_id", id, 1, u32::MAX))
        .transpose()?
        .map(NeuronId::new);

    let events = state.query.recent_events(limit, neuron, since_seconds).await?;
    Ok(Json(events))
}

// ---------------------------------------------------------------------------
// GET /stats -- per-neuron windowed statistics
// ---------------------------------------------------------------------------

/// Return per-neuron spike counts and mean amplitudes over a trailing
/// window, ordered by neuron id ascending.
///
/// # Query Parameters
///
/// - `window_seconds`: 5..=3600 (default 60)
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let window_seconds = validate_range(
        "window_seconds",
        params.window_seconds.unwrap_or(DEFAULT_WINDOW_SECONDS),
        MIN_WINDOW_SECONDS,
        MAX_WINDOW_SECONDS,
    )?;

    let stats = state.query.windowed_stats(window_seconds).await?;
    Ok(Json(stats))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject a parameter outside its documented bounds.
fn validate_range(name: &str, value: u32, min: u32, max: u32) -> Result<u32, ObserverError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ObserverError::InvalidQuery(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}
