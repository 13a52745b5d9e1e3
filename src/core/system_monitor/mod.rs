//! System monitoring core functionality.
//!
//! Metric collection, the alert engine that turns snapshots into alert events,
//! notification sinks and the runtime that ties them together on a timer.

pub mod alerts;
mod collector;
mod metrics;
mod notifier;
pub mod runtime;
mod source;

pub use alerts::{
    evaluate_alerts, is_quiet_hours, parse_time_of_day, AlertEngine, AlertEvent, AlertType,
    EngineState,
};
pub use collector::{best_mount_match, top_by_memory, CollectorConfig, MetricsCollector};
pub use metrics::{
    bytes_to_gib, format_bytes, MetricSnapshot, ProcessMetric, BYTES_PER_GIB, TOP_PROCESS_COUNT,
};
pub use notifier::{ConsoleNotifier, LogNotifier, NotificationSink};
pub use runtime::{info_event, run_cycle, run_cycle_with_clock, MonitorRuntime};
pub use source::MetricSource;
