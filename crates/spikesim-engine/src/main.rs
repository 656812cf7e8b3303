//! Engine binary for the spikesim signal simulator.
//!
//! This is the main entry point that wires together the spike
//! generator, the event store, and the Observer API. It loads
//! configuration, ensures the storage schema exists, starts the
//! generator, and serves HTTP until a shutdown signal arrives.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `spikesim-config.yaml`
//! 3. Open the SQLite pool and run migrations
//! 4. Construct the spike generator and start it
//! 5. Spawn the Observer API server
//! 6. Wait for Ctrl-C
//! 7. Stop the generator with the bounded grace period
//! 8. Close the pool and exit

mod error;

use std::path::Path;
use std::sync::Arc;

use spikesim_core::{QueryService, SimConfig, SpikeGenerator};
use spikesim_db::{SpikePool, SpikeStore};
use spikesim_observer::{AppState, ServerConfig, spawn_observer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Application entry point for the engine.
///
/// Initializes all subsystems and runs until a shutdown signal is
/// received.
///
/// # Errors
///
/// Returns an error if any initialization step fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("spikesim-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        neuron_count = config.generator.neuron_count,
        rate_per_second = config.generator.rate_per_second,
        database_url = %config.database.url,
        "Configuration loaded"
    );

    // 3. Open the database and ensure the schema exists.
    let pool = SpikePool::connect_url(&config.database.url)
        .await
        .map_err(EngineError::from)?;
    pool.run_migrations().await.map_err(EngineError::from)?;
    let store = SpikeStore::new(&pool);

    // 4. Construct and start the spike generator.
    let generator = Arc::new(
        SpikeGenerator::new(config.generator.clone(), store.clone())
            .map_err(EngineError::from)?,
    );
    generator.start().await;
    info!("Spike generator running");

    // 5. Spawn the Observer API server.
    let server_config = ServerConfig {
        host: config.http.host.clone(),
        port: config.http.port,
    };
    let state = Arc::new(AppState::new(
        QueryService::new(store),
        Arc::clone(&generator),
    ));
    let observer_handle = spawn_observer(server_config, state)
        .await
        .map_err(EngineError::from)?;
    info!(port = config.http.port, "Observer API server started");

    // 6. Run until a shutdown signal arrives.
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");

    // 7. Stop the generator; the outcome reports whether the loop
    //    confirmed termination within the grace period.
    let outcome = generator.stop().await;
    info!(outcome = ?outcome, "Spike generator stopped");

    // 8. Tear down the HTTP task and close the pool.
    observer_handle.abort();
    pool.close().await;

    info!("spikesim-engine shutdown complete");
    Ok(())
}

/// Load the simulation configuration from `spikesim-config.yaml`.
///
/// Looks for the config file relative to the current working
/// directory; a missing file falls back to defaults.
fn load_config() -> Result<SimConfig, EngineError> {
    let config_path = Path::new("spikesim-config.yaml");
    if config_path.exists() {
        let config = SimConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimConfig::default())
    }
}
