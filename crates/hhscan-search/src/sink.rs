//! Buffered persistence of fetched places.
//!
//! Details accumulate in memory and are written in batches: an idempotent
//! upsert into the [`PlaceStore`] followed by a CSV snapshot of the same
//! batch. The buffer is cleared only once both writes succeed, so a failed
//! flush can simply be retried.

use std::future::Future;
use std::path::PathBuf;

use hhscan_core::PlaceRow;
use hhscan_places::{flatten_detail, PlaceDetail};

use crate::error::SinkError;
use crate::snapshot::write_snapshot;

/// Upsert-by-id persistence for flattened places.
pub trait PlaceStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Inserts or replaces every row, keyed by `place_id`. Returns the number
    /// of rows written.
    fn upsert_places(
        &self,
        rows: &[PlaceRow],
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

/// Per-flush bookkeeping returned by [`BatchedSink::flush`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub rows_written: u64,
    /// Buffered records discarded because they had no id.
    pub dropped: usize,
}

pub struct BatchedSink<S> {
    store: S,
    snapshot_path: Option<PathBuf>,
    batch_size: usize,
    buffer: Vec<PlaceDetail>,
    flushes: u64,
    rows_written: u64,
    dropped: usize,
}

impl<S: PlaceStore> BatchedSink<S> {
    /// Creates a sink that flushes every `batch_size` records (minimum 1).
    #[must_use]
    pub fn new(store: S, batch_size: usize) -> Self {
        Self {
            store,
            snapshot_path: None,
            batch_size: batch_size.max(1),
            buffer: Vec::with_capacity(batch_size.max(1)),
            flushes: 0,
            rows_written: 0,
            dropped: 0,
        }
    }

    /// Mirrors every flushed batch to a CSV file at `path`.
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Buffers one detail record.
    pub fn accumulate(&mut self, detail: PlaceDetail) {
        self.buffer.push(detail);
    }

    /// `true` once the buffer holds a full batch.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.batch_size
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of flushes that wrote at least one row.
    #[must_use]
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    #[must_use]
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes the buffered batch to the store and the snapshot, then clears it.
    ///
    /// An empty buffer is a no-op. On error the buffer is left intact.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Store`] if the upsert fails, or a snapshot error
    /// if the CSV mirror cannot be written.
    pub async fn flush(&mut self) -> Result<FlushReport, SinkError> {
        if self.buffer.is_empty() {
            return Ok(FlushReport::default());
        }

        let mut rows = Vec::with_capacity(self.buffer.len());
        let mut dropped = 0;
        for detail in &self.buffer {
            match flatten_detail(detail) {
                Some(row) => rows.push(row),
                None => {
                    dropped += 1;
                    tracing::warn!(
                        name = detail.display_name().unwrap_or("<unnamed>"),
                        "dropping buffered place without an id"
                    );
                }
            }
        }

        let mut report = FlushReport {
            rows_written: 0,
            dropped,
        };
        if !rows.is_empty() {
            report.rows_written = self
                .store
                .upsert_places(&rows)
                .await
                .map_err(|e| SinkError::Store(Box::new(e)))?;
            if let Some(path) = &self.snapshot_path {
                write_snapshot(path, &rows)?;
            }
            self.flushes += 1;
            self.rows_written += report.rows_written;
        }

        self.dropped += dropped;
        self.buffer.clear();
        tracing::info!(
            rows = report.rows_written,
            dropped = report.dropped,
            flush = self.flushes,
            "flushed place batch"
        );
        Ok(report)
    }
}
