//! Spike event records and windowed aggregation shapes.
//!
//! A [`SpikeEvent`] is one simulated neural firing: which neuron fired,
//! when, and how hard. Events are immutable once created and never
//! deleted. [`WindowedStats`] is the per-neuron aggregation served by
//! the stats endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{NeuronId, SpikeId};

/// One simulated neural firing record.
///
/// Created only by the generator, once per tick; the id is assigned by
/// the store on append. Timestamps are UTC and serialize as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeEvent {
    /// Store-assigned identifier, strictly increasing in insertion order.
    pub id: SpikeId,
    /// The emitting neuron, in `[1, neuron_count]`.
    pub neuron_id: NeuronId,
    /// Creation time, assigned at generation.
    pub ts: DateTime<Utc>,
    /// Signal magnitude; always non-negative.
    pub amplitude: f64,
}

/// A spike record before the store has assigned it an id.
///
/// The generator builds one of these per tick and hands it to the
/// store's append operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpike {
    /// The emitting neuron.
    pub neuron_id: NeuronId,
    /// Creation time.
    pub ts: DateTime<Utc>,
    /// Signal magnitude; always non-negative.
    pub amplitude: f64,
}

/// Per-neuron aggregate over a trailing time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronStats {
    /// The neuron these counts belong to.
    pub neuron_id: NeuronId,
    /// Number of spikes this neuron emitted inside the window.
    pub count: u64,
    /// Mean amplitude of those spikes.
    pub avg_amp: f64,
}

/// Windowed statistics across all neurons.
///
/// `per_neuron` is ordered by neuron id ascending. An empty window is a
/// valid result: zero total, empty sequence, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedStats {
    /// Length of the trailing window in seconds.
    pub window_seconds: u32,
    /// Sum of all per-neuron counts inside the window.
    pub total_spikes: u64,
    /// Per-neuron aggregates, ordered by neuron id ascending.
    pub per_neuron: Vec<NeuronStats>,
}

impl WindowedStats {
    /// Build stats from per-neuron rows, summing the total.
    pub fn from_rows(window_seconds: u32, per_neuron: Vec<NeuronStats>) -> Self {
        let total_spikes = per_neuron.iter().map(|r| r.count).sum();
        Self {
            window_seconds,
            total_spikes,
            per_neuron,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn spike_event_json_shape() {
        let event = SpikeEvent {
            id: SpikeId::new(1),
            neuron_id: NeuronId::new(4),
            ts: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            amplitude: 1.25,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["neuron_id"], 4);
        assert_eq!(json["ts"], "2026-03-01T12:00:00Z");
        assert!((json["amplitude"].as_f64().unwrap() - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn windowed_stats_sums_counts() {
        let stats = WindowedStats::from_rows(
            60,
            vec![
                NeuronStats {
                    neuron_id: NeuronId::new(1),
                    count: 2,
                    avg_amp: 2.0,
                },
                NeuronStats {
                    neuron_id: NeuronId::new(2),
                    count: 1,
                    avg_amp: 2.0,
                },
            ],
        );
        assert_eq!(stats.total_spikes, 3);
        assert_eq!(stats.per_neuron.len(), 2);
    }

    #[test]
    fn empty_window_is_zero_not_error() {
        let stats = WindowedStats::from_rows(60, Vec::new());
        assert_eq!(stats.total_spikes, 0);
        assert!(stats.per_neuron.is_empty());
    }
}
