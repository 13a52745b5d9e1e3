use super::metrics::MetricSnapshot;
use crate::error::Result;

/// Trait for metric snapshot sources
///
/// The orchestrator calls `collect` once per cycle. An error means the cycle is
/// skipped; sources never hand out partial snapshots.
pub trait MetricSource: Send {
    /// Collect a complete snapshot of the host
    fn collect(&mut self) -> Result<MetricSnapshot>;

    /// Human-readable name of the monitored disk volume
    fn disk_label(&self) -> String;
}
