//! Background spike generation loop.
//!
//! The generator runs on its own Tokio task, independent of request
//! handling. Each tick draws a neuron uniformly from the configured
//! range and an amplitude from a half-normal distribution, then appends
//! one event to the store. Append failures are logged and swallowed --
//! signal continuity takes priority over individual write success, so
//! the loop never stops or crashes on a failed write.
//!
//! # Lifecycle
//!
//! States are {Stopped, Running}. [`SpikeGenerator::start`] is
//! idempotent: calling it while running is a no-op and never spawns a
//! second loop. [`SpikeGenerator::stop`] sets a cooperative stop flag
//! (checked at the top of each tick, so an in-flight append always
//! completes) and waits up to the configured grace period for the task
//! to finish; the returned [`StopOutcome`] reports whether termination
//! was confirmed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use spikesim_db::SpikeStore;
use spikesim_types::{NeuronId, NewSpike};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;

/// Mean of the underlying normal amplitude distribution.
const AMPLITUDE_MEAN: f64 = 1.0;

/// Standard deviation of the underlying normal amplitude distribution.
const AMPLITUDE_STD_DEV: f64 = 0.3;

/// Errors that can occur when constructing the generator.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The configuration is unusable (zero neurons, non-positive rate).
    #[error("invalid generator config: {0}")]
    Config(String),

    /// The amplitude distribution could not be constructed.
    #[error("invalid amplitude distribution: {0}")]
    Distribution(String),
}

/// Result of a [`SpikeGenerator::stop`] call.
///
/// The grace period is bounded, so `stop()` can return before the
/// background task has actually terminated; the variant makes that
/// visible instead of discarding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The background task finished within the grace period.
    Terminated,
    /// The grace period expired; the task will still exit at its next
    /// stop-flag check, but termination was not confirmed.
    GraceExpired,
    /// The generator was not running.
    NotRunning,
}

/// Background producer of synthetic spike events.
///
/// Owns a handle to the store and a cooperative stop flag shared with
/// the loop task. Constructed once at process start and shared behind
/// an [`Arc`]; all methods take `&self`.
pub struct SpikeGenerator {
    config: GeneratorConfig,
    store: SpikeStore,
    amplitude: Normal<f64>,
    stop_requested: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SpikeGenerator {
    /// Create a new generator writing into the given store.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Config`] if `neuron_count` is zero or
    /// `rate_per_second` is not a positive finite number, or
    /// [`GeneratorError::Distribution`] if the amplitude distribution
    /// cannot be constructed.
    pub fn new(config: GeneratorConfig, store: SpikeStore) -> Result<Self, GeneratorError> {
        if config.neuron_count == 0 {
            return Err(GeneratorError::Config(
                "neuron_count must be at least 1".to_owned(),
            ));
        }
        if !(config.rate_per_second.is_finite() && config.rate_per_second > 0.0) {
            return Err(GeneratorError::Config(format!(
                "rate_per_second must be positive, got {}",
                config.rate_per_second
            )));
        }

        let amplitude = Normal::new(AMPLITUDE_MEAN, AMPLITUDE_STD_DEV)
            .map_err(|e| GeneratorError::Distribution(e.to_string()))?;

        Ok(Self {
            config,
            store,
            amplitude,
            stop_requested: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        })
    }

    /// Start the generation loop on a background task.
    ///
    /// Returns `true` if a new loop was started, `false` if one was
    /// already running (no-op; a second concurrent loop is never
    /// spawned).
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;

        if let Some(handle) = task.as_ref()
            && !handle.is_finished()
        {
            debug!("generator already running, start is a no-op");
            return false;
        }

        self.stop_requested.store(false, Ordering::Release);

        let handle = tokio::spawn(run_loop(
            self.config.clone(),
            self.store.clone(),
            self.amplitude,
            Arc::clone(&self.stop_requested),
        ));
        *task = Some(handle);

        info!(
            neuron_count = self.config.neuron_count,
            rate_per_second = self.config.rate_per_second,
            "Spike generator started"
        );
        true
    }

    /// Stop the generation loop.
    ///
    /// Sets the stop flag and waits up to the configured grace period
    /// for the task to finish. If the grace period expires the handle
    /// is released and the task exits on its own at the next flag
    /// check; the outcome reports which of the two happened. Stopping
    /// an already-stopped generator returns
    /// [`StopOutcome::NotRunning`].
    pub async fn stop(&self) -> StopOutcome {
        let mut task = self.task.lock().await;

        let Some(mut handle) = task.take() else {
            return StopOutcome::NotRunning;
        };
        if handle.is_finished() {
            return StopOutcome::NotRunning;
        }

        self.stop_requested.store(true, Ordering::Release);

        let grace = Duration::from_millis(self.config.stop_grace_ms);
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(_) => {
                info!("Spike generator stopped");
                StopOutcome::Terminated
            }
            Err(_) => {
                warn!(
                    grace_ms = self.config.stop_grace_ms,
                    "Generator did not confirm termination within the grace period"
                );
                StopOutcome::GraceExpired
            }
        }
    }

    /// Whether the generation loop is currently running.
    pub async fn is_running(&self) -> bool {
        let task = self.task.lock().await;
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// The configuration this generator was built with.
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

/// The tick loop. Runs until the stop flag is observed.
///
/// The stop check happens at the top of each iteration, so an in-flight
/// tick always completes its append before exiting. The sleep between
/// ticks is the only suspension and holds no locks.
async fn run_loop(
    config: GeneratorConfig,
    store: SpikeStore,
    amplitude: Normal<f64>,
    stop: Arc<AtomicBool>,
) {
    let interval = Duration::from_secs_f64(1.0 / config.rate_per_second);
    let mut rng = StdRng::seed_from_u64(config.seed);

    debug!(
        interval_us = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX),
        "generator loop entered"
    );

    loop {
        if stop.load(Ordering::Acquire) {
            break;
        }

        let (neuron_id, amp) = draw_spike(&mut rng, amplitude, config.neuron_count);
        let spike = NewSpike {
            neuron_id,
            ts: Utc::now(),
            amplitude: amp,
        };

        // Best effort: a failed write is logged and the loop moves on
        // to the next tick.
        if let Err(e) = store.append(&spike).await {
            warn!(error = %e, "spike append failed, continuing");
        }

        tokio::time::sleep(interval).await;
    }

    debug!("generator loop exited");
}

/// Draw one spike: a uniform neuron id and a half-normal amplitude.
///
/// Taking the absolute value of the normal sample guarantees the
/// non-negativity invariant on amplitudes.
fn draw_spike<R: Rng>(rng: &mut R, amplitude: Normal<f64>, neuron_count: u32) -> (NeuronId, f64) {
    let neuron = NeuronId::new(rng.random_range(1..=neuron_count));
    let amp = amplitude.sample(rng).abs();
    (neuron, amp)
}
