//! Read-only windowed queries over the spike store.
//!
//! [`QueryService`] translates caller-supplied trailing windows into
//! store cutoffs and shapes the results. The HTTP boundary validates
//! parameters before they reach this layer, but since this is also a
//! library API the service clamps everything into the documented
//! bounds defensively -- out-of-range inputs are pulled to the nearest
//! bound rather than rejected.

use chrono::{Duration, Utc};
use spikesim_db::{DbError, SpikeStore};
use spikesim_types::{NeuronId, SpikeEvent, WindowedStats};

/// Smallest accepted result limit.
pub const MIN_LIMIT: u32 = 1;
/// Largest accepted result limit.
pub const MAX_LIMIT: u32 = 5_000;
/// Default result limit when the caller gives none.
pub const DEFAULT_LIMIT: u32 = 200;

/// Smallest accepted recent-events window in seconds.
pub const MIN_SINCE_SECONDS: u32 = 1;
/// Largest accepted recent-events window in seconds.
pub const MAX_SINCE_SECONDS: u32 = 3_600;
/// Default recent-events window when the caller gives none.
pub const DEFAULT_SINCE_SECONDS: u32 = 60;

/// Smallest accepted stats window in seconds.
pub const MIN_WINDOW_SECONDS: u32 = 5;
/// Largest accepted stats window in seconds.
pub const MAX_WINDOW_SECONDS: u32 = 3_600;
/// Default stats window when the caller gives none.
pub const DEFAULT_WINDOW_SECONDS: u32 = 60;

/// Read-only query operations over the spike store.
///
/// Reads are one-shot: no retries, no caching. Storage failures
/// propagate to the caller as [`DbError`].
#[derive(Clone)]
pub struct QueryService {
    store: SpikeStore,
}

impl QueryService {
    /// Create a new query service reading from the given store.
    pub const fn new(store: SpikeStore) -> Self {
        Self { store }
    }

    /// Fetch recent events, newest first.
    ///
    /// `limit` is clamped to `[1, 5000]` and `since_seconds` to
    /// `[1, 3600]`; the cutoff is `now - since_seconds`. When `neuron`
    /// is given only that neuron's events are returned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is unavailable.
    pub async fn recent_events(
        &self,
        limit: u32,
        neuron: Option<NeuronId>,
        since_seconds: u32,
    ) -> Result<Vec<SpikeEvent>, DbError> {
        let limit = limit.clamp(MIN_LIMIT, MAX_LIMIT);
        let since_seconds = since_seconds.clamp(MIN_SINCE_SECONDS, MAX_SINCE_SECONDS);
        let cutoff = Utc::now() - Duration::seconds(i64::from(since_seconds));
        self.store.query_recent(cutoff, limit, neuron).await
    }

    /// Compute per-neuron statistics over a trailing window.
    ///
    /// `window_seconds` is clamped to `[5, 3600]`. A window containing
    /// no events yields zero totals and an empty per-neuron sequence,
    /// never an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store is unavailable.
    pub async fn windowed_stats(&self, window_seconds: u32) -> Result<WindowedStats, DbError> {
        let window_seconds = window_seconds.clamp(MIN_WINDOW_SECONDS, MAX_WINDOW_SECONDS);
        let cutoff = Utc::now() - Duration::seconds(i64::from(window_seconds));
        let per_neuron = self.store.aggregate_window(cutoff).await?;
        Ok(WindowedStats::from_rows(window_seconds, per_neuron))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::indexing_slicing)]

    use super::*;
    use spikesim_db::SpikePool;
    use spikesim_types::NewSpike;

    async fn setup() -> (SpikeStore, QueryService) {
        let pool = SpikePool::connect_in_memory().await.unwrap();
        pool.run_migrations().await.unwrap();
        let store = SpikeStore::new(&pool);
        let service = QueryService::new(store.clone());
        (store, service)
    }

    fn spike(neuron: u32, seconds_ago: i64, amplitude: f64) -> NewSpike {
        NewSpike {
            neuron_id: NeuronId::new(neuron),
            ts: Utc::now() - Duration::seconds(seconds_ago),
            amplitude,
        }
    }

    #[tokio::test]
    async fn recent_events_excludes_events_older_than_window() {
        let (store, service) = setup().await;
        let recent = store.append(&spike(1, 5, 1.0)).await.unwrap();
        store.append(&spike(1, 120, 1.0)).await.unwrap();

        let events = service.recent_events(100, None, 60).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, recent);
    }

    #[tokio::test]
    async fn recent_events_clamps_limit_to_lower_bound() {
        let (store, service) = setup().await;
        for i in 0..5 {
            store.append(&spike(1, i, 1.0)).await.unwrap();
        }

        // A limit of 0 is below the bound and clamps to 1.
        let events = service.recent_events(0, None, 60).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn recent_events_clamps_oversized_window() {
        let (store, service) = setup().await;
        store.append(&spike(1, 10, 1.0)).await.unwrap();

        // 100_000 seconds clamps to 3_600; the event is still inside.
        let events = service.recent_events(10, None, 100_000).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn recent_events_filters_by_neuron() {
        let (store, service) = setup().await;
        store.append(&spike(1, 1, 1.0)).await.unwrap();
        store.append(&spike(2, 1, 1.0)).await.unwrap();

        let events = service
            .recent_events(100, Some(NeuronId::new(2)), 60)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].neuron_id, NeuronId::new(2));
    }

    #[tokio::test]
    async fn windowed_stats_on_empty_window_is_zero_not_error() {
        let (_store, service) = setup().await;

        let stats = service.windowed_stats(60).await.unwrap();
        assert_eq!(stats.window_seconds, 60);
        assert_eq!(stats.total_spikes, 0);
        assert!(stats.per_neuron.is_empty());
    }

    #[tokio::test]
    async fn windowed_stats_aggregates_per_neuron() {
        let (store, service) = setup().await;
        store.append(&spike(1, 1, 1.0)).await.unwrap();
        store.append(&spike(1, 2, 3.0)).await.unwrap();
        store.append(&spike(2, 3, 2.0)).await.unwrap();

        let stats = service.windowed_stats(60).await.unwrap();
        assert_eq!(stats.total_spikes, 3);
        assert_eq!(stats.per_neuron.len(), 2);
        assert_eq!(stats.per_neuron[0].neuron_id, NeuronId::new(1));
        assert_eq!(stats.per_neuron[0].count, 2);
        assert!((stats.per_neuron[0].avg_amp - 2.0).abs() < 1e-9);
        assert_eq!(stats.per_neuron[1].neuron_id, NeuronId::new(2));
        assert_eq!(stats.per_neuron[1].count, 1);
        assert!((stats.per_neuron[1].avg_amp - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn windowed_stats_clamps_undersized_window() {
        let (_store, service) = setup().await;

        // 0 clamps to the 5-second minimum and is reported as such.
        let stats = service.windowed_stats(0).await.unwrap();
        assert_eq!(stats.window_seconds, 5);
    }
}
