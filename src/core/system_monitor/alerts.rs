//! Alert engine.
//!
//! Turns metric snapshots into alert events. The engine keeps a small amount of
//! state between cycles: when each alert type last fired (for the cooldown) and
//! when the current CPU breach started (for the sustained-duration requirement).
//! Quiet hours suppress the whole cycle without touching that state.

use std::fmt;

use chrono::{DateTime, Local, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use super::metrics::{bytes_to_gib, MetricSnapshot};
use crate::core::config::{Config, CooldownConfig, CpuAlertConfig, DiskAlertConfig, MemoryAlertConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Cpu,
    MemoryOverall,
    MemoryProcess,
    Disk,
    /// Informational message outside the alerting taxonomy, never rate limited
    Info,
}

impl AlertType {
    /// Alert types subject to cooldown tracking, in evaluation order
    pub const TRACKED: [AlertType; 4] = [
        AlertType::Cpu,
        AlertType::MemoryOverall,
        AlertType::MemoryProcess,
        AlertType::Disk,
    ];

    fn slot(self) -> Option<usize> {
        match self {
            AlertType::Cpu => Some(0),
            AlertType::MemoryOverall => Some(1),
            AlertType::MemoryProcess => Some(2),
            AlertType::Disk => Some(3),
            AlertType::Info => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Cpu => "cpu",
            AlertType::MemoryOverall => "memory_overall",
            AlertType::MemoryProcess => "memory_process",
            AlertType::Disk => "disk",
            AlertType::Info => "info",
        }
    }

    /// User-facing notification title
    pub fn title(self) -> &'static str {
        match self {
            AlertType::Cpu => "High CPU Usage",
            AlertType::MemoryOverall => "High Memory Usage",
            AlertType::MemoryProcess => "Process Memory Alert",
            AlertType::Disk => "Low Disk Space",
            AlertType::Info => "System Info",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert produced by one evaluation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub timestamp: DateTime<Local>,
    pub alert_type: AlertType,
    pub message: String,
    /// Percent for CPU and memory, GB for process memory and disk
    pub current_value: f64,
    pub threshold_value: f64,
    pub process_name: Option<String>,
    pub process_pid: Option<u32>,
}

impl AlertEvent {
    /// Informational event with no threshold attached
    pub fn info<S: Into<String>>(timestamp: DateTime<Local>, message: S) -> Self {
        Self {
            timestamp,
            alert_type: AlertType::Info,
            message: message.into(),
            current_value: 0.0,
            threshold_value: 0.0,
            process_name: None,
            process_pid: None,
        }
    }

    fn threshold(
        timestamp: DateTime<Local>,
        alert_type: AlertType,
        message: String,
        current_value: f64,
        threshold_value: f64,
    ) -> Self {
        Self {
            timestamp,
            alert_type,
            message,
            current_value,
            threshold_value,
            process_name: None,
            process_pid: None,
        }
    }
}

/// State carried between evaluation cycles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineState {
    last_alert: [Option<DateTime<Local>>; 4],
    /// Start of the current CPU breach; `None` once CPU is back at or below threshold
    pub cpu_breach_start: Option<DateTime<Local>>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// When an alert of this type last fired, if ever
    pub fn last_alert_time(&self, alert_type: AlertType) -> Option<DateTime<Local>> {
        alert_type.slot().and_then(|slot| self.last_alert[slot])
    }

    /// Record an emitted alert. `Info` is not tracked.
    pub fn record_alert(&mut self, alert_type: AlertType, at: DateTime<Local>) {
        if let Some(slot) = alert_type.slot() {
            self.last_alert[slot] = Some(at);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn can_alert(&self, alert_type: AlertType, now: DateTime<Local>, cooldown: TimeDelta) -> bool {
        match self.last_alert_time(alert_type) {
            None => true,
            Some(last) => now.signed_duration_since(last) >= cooldown,
        }
    }
}

/// Owns an `EngineState` together with the config it evaluates against
#[derive(Debug, Clone)]
pub struct AlertEngine {
    config: Config,
    state: EngineState,
}

impl AlertEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: EngineState::new(),
        }
    }

    pub fn evaluate(&mut self, snapshot: &MetricSnapshot, now: DateTime<Local>) -> Vec<AlertEvent> {
        evaluate_alerts(&self.config, &mut self.state, snapshot, now)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Swap in a new config. Breach and cooldown tracking start over.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

/// Evaluate a snapshot against the configured thresholds.
///
/// Checks run in a fixed order (CPU, overall memory, process memory, disk) and
/// each alert type is rate limited by its own cooldown. `now` is the evaluation
/// instant; it drives quiet hours and cooldowns, while breach durations are
/// measured in snapshot time.
pub fn evaluate_alerts(
    config: &Config,
    state: &mut EngineState,
    snapshot: &MetricSnapshot,
    now: DateTime<Local>,
) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();

    if is_quiet_hours(&config.cooldown, &now) {
        return alerts;
    }

    let cooldown = seconds_to_delta(config.cooldown.duration_minutes.saturating_mul(60));

    if config.cpu.enabled {
        if let Some(alert) = check_cpu(&config.cpu, state, snapshot, now, cooldown) {
            alerts.push(alert);
        }
    }

    if config.memory.enabled {
        if let Some(alert) = check_memory_overall(&config.memory, state, snapshot, now, cooldown) {
            alerts.push(alert);
        }
        if let Some(alert) = check_memory_process(&config.memory, state, snapshot, now, cooldown) {
            alerts.push(alert);
        }
    }

    if config.disk.enabled {
        if let Some(alert) = check_disk(&config.disk, state, snapshot, now, cooldown) {
            alerts.push(alert);
        }
    }

    alerts
}

fn check_cpu(
    config: &CpuAlertConfig,
    state: &mut EngineState,
    snapshot: &MetricSnapshot,
    now: DateTime<Local>,
    cooldown: TimeDelta,
) -> Option<AlertEvent> {
    let threshold = config.threshold_percent;

    let over_threshold = snapshot.cpu_percent > threshold;
    if !over_threshold {
        // Any dip cancels the sustained-breach tracking
        state.cpu_breach_start = None;
        return None;
    }

    let breach_start = *state.cpu_breach_start.get_or_insert(snapshot.timestamp);
    let sustained = snapshot.timestamp.signed_duration_since(breach_start);
    if sustained < seconds_to_delta(config.duration_seconds) {
        return None;
    }

    if !state.can_alert(AlertType::Cpu, now, cooldown) {
        return None;
    }

    state.record_alert(AlertType::Cpu, snapshot.timestamp);
    Some(AlertEvent::threshold(
        snapshot.timestamp,
        AlertType::Cpu,
        format!(
            "CPU exceeded {:.1}% (current: {:.1}%)",
            threshold, snapshot.cpu_percent
        ),
        snapshot.cpu_percent,
        threshold,
    ))
}

fn check_memory_overall(
    config: &MemoryAlertConfig,
    state: &mut EngineState,
    snapshot: &MetricSnapshot,
    now: DateTime<Local>,
    cooldown: TimeDelta,
) -> Option<AlertEvent> {
    let threshold = config.overall_threshold_percent;

    let over_threshold = snapshot.memory_percent > threshold;
    if !over_threshold || !state.can_alert(AlertType::MemoryOverall, now, cooldown) {
        return None;
    }

    state.record_alert(AlertType::MemoryOverall, snapshot.timestamp);
    Some(AlertEvent::threshold(
        snapshot.timestamp,
        AlertType::MemoryOverall,
        format!(
            "Memory usage exceeded {:.1}% (current: {:.1}%)",
            threshold, snapshot.memory_percent
        ),
        snapshot.memory_percent,
        threshold,
    ))
}

/// Only the first (largest) offending process is reported per cycle
fn check_memory_process(
    config: &MemoryAlertConfig,
    state: &mut EngineState,
    snapshot: &MetricSnapshot,
    now: DateTime<Local>,
    cooldown: TimeDelta,
) -> Option<AlertEvent> {
    let threshold_bytes = config.process_threshold_bytes;
    let process = snapshot
        .top_processes
        .iter()
        .find(|p| p.memory_used_bytes > threshold_bytes)?;

    if !state.can_alert(AlertType::MemoryProcess, now, cooldown) {
        return None;
    }

    state.record_alert(AlertType::MemoryProcess, snapshot.timestamp);

    let threshold_gb = bytes_to_gib(threshold_bytes);
    let current_gb = bytes_to_gib(process.memory_used_bytes);
    Some(AlertEvent {
        process_name: Some(process.name.clone()),
        process_pid: Some(process.pid),
        ..AlertEvent::threshold(
            snapshot.timestamp,
            AlertType::MemoryProcess,
            format!(
                "{} using {:.1} GB (threshold {:.1} GB)",
                process.name, current_gb, threshold_gb
            ),
            current_gb,
            threshold_gb,
        )
    })
}

fn check_disk(
    config: &DiskAlertConfig,
    state: &mut EngineState,
    snapshot: &MetricSnapshot,
    now: DateTime<Local>,
    cooldown: TimeDelta,
) -> Option<AlertEvent> {
    let threshold_gb = config.minimum_free_gb;
    let free_gb = snapshot.disk_free_gb();

    let below_minimum = free_gb < threshold_gb;
    if !below_minimum || !state.can_alert(AlertType::Disk, now, cooldown) {
        return None;
    }

    state.record_alert(AlertType::Disk, snapshot.timestamp);
    Some(AlertEvent::threshold(
        snapshot.timestamp,
        AlertType::Disk,
        format!(
            "Disk free space below {:.1} GB (current: {:.1} GB)",
            threshold_gb, free_gb
        ),
        free_gb,
        threshold_gb,
    ))
}

/// Whether `now` falls inside the configured quiet window.
///
/// The window may wrap past midnight. An unparsable boundary disables quiet
/// hours instead of failing the cycle.
pub fn is_quiet_hours<T: Timelike>(cooldown: &CooldownConfig, now: &T) -> bool {
    let (Some(start), Some(end)) = (
        parse_time_of_day(&cooldown.quiet_hours_start),
        parse_time_of_day(&cooldown.quiet_hours_end),
    ) else {
        log::debug!(
            "Ignoring quiet hours, cannot parse {:?} - {:?}",
            cooldown.quiet_hours_start,
            cooldown.quiet_hours_end
        );
        return false;
    };

    let current = now.hour() * 60 + now.minute();

    if start < end {
        current >= start && current < end
    } else {
        current >= start || current < end
    }
}

/// Parse "HH:MM" (or "HH:MM:SS", seconds ignored) into minutes since midnight
pub fn parse_time_of_day(value: &str) -> Option<u32> {
    let value = value.trim();
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()?;
    Some(time.hour() * 60 + time.minute())
}

fn seconds_to_delta(seconds: u64) -> TimeDelta {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
