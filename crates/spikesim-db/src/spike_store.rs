//! Spike event store: append and windowed query operations.
//!
//! The `spikes` table is the source of truth for the simulated signal
//! stream. The generator appends exactly one row per tick; ids are
//! assigned by SQLite (`AUTOINCREMENT`) so they are unique and strictly
//! increasing in insertion order, and each insert is atomic with
//! respect to readers.

use chrono::{DateTime, Utc};
use spikesim_types::{NeuronId, NeuronStats, NewSpike, SpikeEvent, SpikeId};

use crate::error::DbError;
use crate::sqlite::SpikePool;

/// Operations on the `spikes` table.
#[derive(Clone)]
pub struct SpikeStore {
    pool: SpikePool,
}

impl SpikeStore {
    /// Create a new spike store sharing the given connection pool.
    pub fn new(pool: &SpikePool) -> Self {
        Self { pool: pool.clone() }
    }

    /// Append one spike event and return its store-assigned id.
    ///
    /// The insert is a single statement, so id allocation stays atomic
    /// even if a future caller adds concurrent writers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails.
    pub async fn append(&self, spike: &NewSpike) -> Result<SpikeId, DbError> {
        let result =
            sqlx::query(r"INSERT INTO spikes (neuron_id, ts_ms, amplitude) VALUES (?1, ?2, ?3)")
                .bind(i64::from(spike.neuron_id.into_inner()))
                .bind(spike.ts.timestamp_millis())
                .bind(spike.amplitude)
                .execute(self.pool.pool())
                .await?;

        let id = SpikeId::new(result.last_insert_rowid());
        tracing::debug!(id = %id, neuron_id = %spike.neuron_id, "Appended spike");
        Ok(id)
    }

    /// Query events with `ts >= since`, newest first, truncated to `limit`.
    ///
    /// When `neuron` is given, only that neuron's events are returned.
    /// Ordering is by timestamp descending with the id as tiebreaker so
    /// same-millisecond events enumerate deterministically.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn query_recent(
        &self,
        since: DateTime<Utc>,
        limit: u32,
        neuron: Option<NeuronId>,
    ) -> Result<Vec<SpikeEvent>, DbError> {
        let since_ms = since.timestamp_millis();
        let limit_i64 = i64::from(limit);

        let rows = if let Some(neuron) = neuron {
            sqlx::query_as::<_, SpikeRow>(
                r"SELECT id, neuron_id, ts_ms, amplitude
                  FROM spikes
                  WHERE ts_ms >= ?1 AND neuron_id = ?2
                  ORDER BY ts_ms DESC, id DESC
                  LIMIT ?3",
            )
            .bind(since_ms)
            .bind(i64::from(neuron.into_inner()))
            .bind(limit_i64)
            .fetch_all(self.pool.pool())
            .await?
        } else {
            sqlx::query_as::<_, SpikeRow>(
                r"SELECT id, neuron_id, ts_ms, amplitude
                  FROM spikes
                  WHERE ts_ms >= ?1
                  ORDER BY ts_ms DESC, id DESC
                  LIMIT ?2",
            )
            .bind(since_ms)
            .bind(limit_i64)
            .fetch_all(self.pool.pool())
            .await?
        };

        Ok(rows.into_iter().map(SpikeRow::into_event).collect())
    }

    /// Aggregate events with `ts >= since`, grouped by neuron.
    ///
    /// Returns one row per neuron that fired inside the window, with
    /// spike count and mean amplitude, ordered by neuron id ascending.
    /// A window with no events yields an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn aggregate_window(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<NeuronStats>, DbError> {
        let rows = sqlx::query_as::<_, NeuronWindowRow>(
            r"SELECT neuron_id, COUNT(id) AS count, AVG(amplitude) AS avg_amp
              FROM spikes
              WHERE ts_ms >= ?1
              GROUP BY neuron_id
              ORDER BY neuron_id ASC",
        )
        .bind(since.timestamp_millis())
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows.into_iter().map(NeuronWindowRow::into_stats).collect())
    }
}

/// A row from the `spikes` table.
///
/// Uses the raw SQLite column types; conversion to the shared
/// [`SpikeEvent`] type happens in [`SpikeRow::into_event`] with
/// saturating conversions for values outside the expected ranges.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SpikeRow {
    /// Auto-incremented spike id.
    id: i64,
    /// The emitting neuron.
    neuron_id: i64,
    /// Event time as epoch milliseconds.
    ts_ms: i64,
    /// Signal magnitude.
    amplitude: f64,
}

impl SpikeRow {
    /// Convert the raw row into the shared event type.
    fn into_event(self) -> SpikeEvent {
        SpikeEvent {
            id: SpikeId::new(self.id),
            neuron_id: NeuronId::new(u32::try_from(self.neuron_id).unwrap_or(u32::MAX)),
            ts: DateTime::<Utc>::from_timestamp_millis(self.ts_ms)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            amplitude: self.amplitude,
        }
    }
}

/// One per-neuron aggregation row.
#[derive(Debug, Clone, sqlx::FromRow)]
struct NeuronWindowRow {
    /// The neuron this group belongs to.
    neuron_id: i64,
    /// Number of spikes in the window.
    count: i64,
    /// Mean amplitude over the window.
    avg_amp: f64,
}

impl NeuronWindowRow {
    /// Convert the raw row into the shared stats type.
    fn into_stats(self) -> NeuronStats {
        NeuronStats {
            neuron_id: NeuronId::new(u32::try_from(self.neuron_id).unwrap_or(u32::MAX)),
            count: u64::try_from(self.count).unwrap_or(0),
            avg_amp: self.avg_amp,
        }
    }
}
