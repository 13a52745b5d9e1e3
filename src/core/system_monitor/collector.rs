use std::path::{Path, PathBuf};
use std::time::Instant;

use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, RefreshKind,
    System, MINIMUM_CPU_UPDATE_INTERVAL,
};

use crate::core::config::Config;
use crate::error::{MonitorError, Result};

use super::metrics::{MetricSnapshot, ProcessMetric, TOP_PROCESS_COUNT};
use super::source::MetricSource;

/// Configuration for metrics collection
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Any path on the volume whose free space is reported
    pub disk_path: PathBuf,
    pub top_processes_count: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CollectorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            disk_path: PathBuf::from(&config.disk.path),
            top_processes_count: TOP_PROCESS_COUNT,
        }
    }
}

/// Collects host metrics through sysinfo
pub struct MetricsCollector {
    system: System,
    disks: Disks,
    config: CollectorConfig,
    last_cpu_refresh: Instant,
}

impl MetricsCollector {
    /// Create a new MetricsCollector with default configuration
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    /// Create a new MetricsCollector with custom configuration
    pub fn with_config(config: CollectorConfig) -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());

        // Performs the first CPU refresh, which later usage readings diff against
        let system = System::new_with_specifics(refresh_kind);
        let disks = Disks::new_with_refreshed_list();

        Self {
            system,
            disks,
            config,
            last_cpu_refresh: Instant::now(),
        }
    }

    fn refresh_cpu(&mut self) {
        let elapsed = self.last_cpu_refresh.elapsed();
        if elapsed < MINIMUM_CPU_UPDATE_INTERVAL {
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL - elapsed);
        }
        self.system.refresh_cpu_usage();
        self.last_cpu_refresh = Instant::now();
    }

    fn collect_disk(&mut self) -> Result<(u64, u64)> {
        self.disks.refresh(true);

        let mount_points: Vec<&Path> = self.disks.iter().map(|d| d.mount_point()).collect();
        let index = best_mount_match(&self.config.disk_path, &mount_points).ok_or_else(|| {
            MonitorError::metric_collection(format!(
                "no mounted volume contains {}",
                self.config.disk_path.display()
            ))
        })?;

        let disk = &self.disks.list()[index];
        Ok((disk.available_space(), disk.total_space()))
    }

    fn collect_top_processes(&mut self) -> Vec<ProcessMetric> {
        let refreshed = self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        if refreshed == 0 {
            log::debug!("Process enumeration returned nothing, reporting no top processes");
            return Vec::new();
        }

        let processes = self
            .system
            .processes()
            .values()
            .map(|proc| ProcessMetric {
                pid: proc.pid().as_u32(),
                name: proc.name().to_string_lossy().to_string(),
                memory_used_bytes: proc.memory(),
            })
            .filter(|p| !p.name.is_empty())
            .collect();

        top_by_memory(processes, self.config.top_processes_count)
    }
}

impl MetricSource for MetricsCollector {
    fn collect(&mut self) -> Result<MetricSnapshot> {
        self.refresh_cpu();
        self.system.refresh_memory();

        let memory_total = self.system.total_memory();
        if memory_total == 0 {
            return Err(MonitorError::metric_collection(
                "memory information unavailable",
            ));
        }
        let memory_used = self.system.used_memory();

        let (disk_free, disk_total) = self.collect_disk()?;
        let top_processes = self.collect_top_processes();

        Ok(MetricSnapshot {
            timestamp: chrono::Local::now(),
            cpu_percent: f64::from(self.system.global_cpu_usage()),
            memory_used_bytes: memory_used,
            memory_total_bytes: memory_total,
            memory_percent: (memory_used as f64 / memory_total as f64) * 100.0,
            disk_free_bytes: disk_free,
            disk_total_bytes: disk_total,
            top_processes,
        })
    }

    fn disk_label(&self) -> String {
        self.config.disk_path.display().to_string()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the mount point containing `target`: an exact match, otherwise
/// the deepest mount point that is a prefix of it.
pub fn best_mount_match(target: &Path, mount_points: &[&Path]) -> Option<usize> {
    mount_points
        .iter()
        .enumerate()
        .filter(|(_, mount)| target.starts_with(mount))
        .max_by_key(|(_, mount)| mount.components().count())
        .map(|(index, _)| index)
}

/// Sort processes by memory use, largest first, and keep the first `count`
pub fn top_by_memory(mut processes: Vec<ProcessMetric>, count: usize) -> Vec<ProcessMetric> {
    processes.sort_by(|a, b| {
        b.memory_used_bytes
            .cmp(&a.memory_used_bytes)
            .then(a.pid.cmp(&b.pid))
    });
    processes.truncate(count);
    processes
}
