use super::row::SnapshotRow;
use crate::error::Result;

/// Somewhere a snapshot row can be appended.
///
/// Sinks are injected into a [`Session`](crate::Session), so the
/// calculation never depends on a particular backend being reachable.
pub trait RowSink {
    /// Human readable name, used in status and error messages.
    fn name(&self) -> String;

    /// Append one row. Implementations do not retry.
    fn append_row(&mut self, row: &SnapshotRow) -> Result<()>;
}
