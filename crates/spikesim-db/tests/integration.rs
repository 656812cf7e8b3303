//! Integration tests for the `spikesim-db` data layer.
//!
//! These tests run against an in-memory SQLite database, so no external
//! services are required and they execute during normal `cargo test`
//! runs.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::items_after_statements,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use chrono::{Duration, Utc};
use spikesim_db::{SpikePool, SpikeStore};
use spikesim_types::{NeuronId, NewSpike};

// =============================================================================
// Helper: open an in-memory database and run migrations
// =============================================================================

async fn setup_store() -> SpikeStore {
    let pool = SpikePool::connect_in_memory()
        .await
        .expect("Failed to open in-memory SQLite");
    pool.run_migrations().await.expect("Failed to run migrations");
    SpikeStore::new(&pool)
}

fn spike(neuron: u32, seconds_ago: i64, amplitude: f64) -> NewSpike {
    NewSpike {
        neuron_id: NeuronId::new(neuron),
        ts: Utc::now() - Duration::seconds(seconds_ago),
        amplitude,
    }
}

// =============================================================================
// Append
// =============================================================================

#[tokio::test]
async fn append_assigns_strictly_increasing_ids_without_gaps() {
    let store = setup_store().await;

    let mut ids = Vec::new();
    for i in 0..20 {
        let id = store.append(&spike(1, 0, 1.0 + f64::from(i) * 0.01)).await.unwrap();
        ids.push(id.into_inner());
    }

    for pair in ids.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "ids must increase by exactly one");
    }
}

#[tokio::test]
async fn append_returns_id_of_inserted_row() {
    let store = setup_store().await;

    let id = store.append(&spike(3, 0, 0.5)).await.unwrap();
    let events = store
        .query_recent(Utc::now() - Duration::seconds(60), 10, None)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, id);
    assert_eq!(events[0].neuron_id, NeuronId::new(3));
    assert!((events[0].amplitude - 0.5).abs() < 1e-9);
}

// =============================================================================
// Recent query
// =============================================================================

#[tokio::test]
async fn query_recent_excludes_events_older_than_cutoff() {
    let store = setup_store().await;

    let recent = store.append(&spike(1, 5, 1.0)).await.unwrap();
    store.append(&spike(1, 120, 1.0)).await.unwrap();

    let events = store
        .query_recent(Utc::now() - Duration::seconds(60), 100, None)
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, recent);
}

#[tokio::test]
async fn query_recent_respects_limit_and_returns_newest_first() {
    let store = setup_store().await;

    // Ten events, one per second, the most recent one second ago.
    for i in 0..10 {
        store.append(&spike(1, 10 - i, 1.0)).await.unwrap();
    }

    let events = store
        .query_recent(Utc::now() - Duration::seconds(3600), 3, None)
        .await
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(events[0].ts >= events[1].ts);
    assert!(events[1].ts >= events[2].ts);
    // The three newest are the last three appended.
    assert!(events.iter().all(|e| e.ts >= Utc::now() - Duration::seconds(4)));
}

#[tokio::test]
async fn query_recent_filters_by_neuron() {
    let store = setup_store().await;

    store.append(&spike(1, 1, 1.0)).await.unwrap();
    store.append(&spike(2, 1, 1.0)).await.unwrap();
    store.append(&spike(1, 2, 1.0)).await.unwrap();

    let events = store
        .query_recent(
            Utc::now() - Duration::seconds(60),
            100,
            Some(NeuronId::new(1)),
        )
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.neuron_id == NeuronId::new(1)));
}

#[tokio::test]
async fn query_recent_on_empty_store_returns_empty() {
    let store = setup_store().await;

    let events = store
        .query_recent(Utc::now() - Duration::seconds(60), 100, None)
        .await
        .unwrap();

    assert!(events.is_empty());
}

// =============================================================================
// Windowed aggregation
// =============================================================================

#[tokio::test]
async fn aggregate_window_groups_counts_and_averages() {
    let store = setup_store().await;

    store.append(&spike(1, 1, 1.0)).await.unwrap();
    store.append(&spike(1, 2, 3.0)).await.unwrap();
    store.append(&spike(2, 3, 2.0)).await.unwrap();

    let rows = store
        .aggregate_window(Utc::now() - Duration::seconds(60))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].neuron_id, NeuronId::new(1));
    assert_eq!(rows[0].count, 2);
    assert!((rows[0].avg_amp - 2.0).abs() < 1e-9);
    assert_eq!(rows[1].neuron_id, NeuronId::new(2));
    assert_eq!(rows[1].count, 1);
    assert!((rows[1].avg_amp - 2.0).abs() < 1e-9);
}

#[tokio::test]
async fn aggregate_window_orders_by_neuron_ascending() {
    let store = setup_store().await;

    store.append(&spike(3, 1, 1.0)).await.unwrap();
    store.append(&spike(1, 1, 1.0)).await.unwrap();
    store.append(&spike(2, 1, 1.0)).await.unwrap();

    let rows = store
        .aggregate_window(Utc::now() - Duration::seconds(60))
        .await
        .unwrap();

    let neurons: Vec<u32> = rows.iter().map(|r| r.neuron_id.into_inner()).collect();
    assert_eq!(neurons, vec![1, 2, 3]);
}

#[tokio::test]
async fn aggregate_window_excludes_events_outside_window() {
    let store = setup_store().await;

    store.append(&spike(1, 5, 1.0)).await.unwrap();
    store.append(&spike(1, 120, 9.0)).await.unwrap();

    let rows = store
        .aggregate_window(Utc::now() - Duration::seconds(60))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 1);
    assert!((rows[0].avg_amp - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn aggregate_window_on_empty_store_returns_empty() {
    let store = setup_store().await;

    let rows = store
        .aggregate_window(Utc::now() - Duration::seconds(60))
        .await
        .unwrap();

    assert!(rows.is_empty());
}
