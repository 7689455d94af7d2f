use std::fmt;

use tracing::{error, info};

use idea_pulse_common::SearchRecord;

use crate::traits::RecordSink;

/// Rows per insert call.
pub const BATCH_SIZE: usize = 50;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistStats {
    pub batches_written: usize,
    pub batches_failed: usize,
    pub rows_written: usize,
}

impl fmt::Display for PersistStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in {} batches ({} batches failed)",
            self.rows_written, self.batches_written, self.batches_failed
        )
    }
}

/// Append `records` to `table` in input order, [`BATCH_SIZE`] rows per call.
///
/// Best effort: a failed batch is logged and the next one is still attempted.
/// Nothing is deduplicated against rows already in the table.
pub async fn persist(sink: &dyn RecordSink, table: &str, records: &[SearchRecord]) -> PersistStats {
    let mut stats = PersistStats::default();
    if records.is_empty() {
        return stats;
    }

    for (index, batch) in records.chunks(BATCH_SIZE).enumerate() {
        match sink.insert_batch(table, batch).await {
            Ok(()) => {
                stats.batches_written += 1;
                stats.rows_written += batch.len();
                info!(table, batch = index, rows = batch.len(), "Saved {} posts", batch.len());
            }
            Err(e) => {
                stats.batches_failed += 1;
                error!(table, batch = index, rows = batch.len(), error = %e, "Error saving batch");
            }
        }
    }

    stats
}
