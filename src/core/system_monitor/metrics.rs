use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Number of processes kept in a snapshot, largest memory consumer first
pub const TOP_PROCESS_COUNT: usize = 5;

pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Point-in-time sample of host resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Local>,
    /// Not clamped; some sources report above 100 on multi-core hosts
    pub cpu_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub memory_percent: f64,
    pub disk_free_bytes: u64,
    pub disk_total_bytes: u64,
    /// Descending by memory use, at most `TOP_PROCESS_COUNT` entries
    pub top_processes: Vec<ProcessMetric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetric {
    pub pid: u32,
    pub name: String,
    pub memory_used_bytes: u64,
}

impl MetricSnapshot {
    /// An idle snapshot: nothing in it breaches the default thresholds
    pub fn empty(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            cpu_percent: 0.0,
            memory_used_bytes: 0,
            memory_total_bytes: 0,
            memory_percent: 0.0,
            disk_free_bytes: u64::MAX,
            disk_total_bytes: u64::MAX,
            top_processes: Vec::new(),
        }
    }

    pub fn disk_free_gb(&self) -> f64 {
        bytes_to_gib(self.disk_free_bytes)
    }
}

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Format a byte count with binary units ("1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}
