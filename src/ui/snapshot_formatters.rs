use colored::*;

use crate::core::config::Config;
use crate::core::system_monitor::{bytes_to_gib, format_bytes, AlertEvent, MetricSnapshot};

/// Render a snapshot as a sectioned report, highlighting values past their thresholds
pub fn format_snapshot(snapshot: &MetricSnapshot, config: &Config, disk_label: &str) -> String {
    let mut out = Vec::new();

    out.push(format!("\n{}", "SYSTEM METRICS".bold().bright_cyan()));
    out.push("=".repeat(60));
    out.push(format!(
        "  {}",
        snapshot
            .timestamp
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    ));

    out.push(section_header("CPU"));
    let cpu = format!("{:.1}%", snapshot.cpu_percent);
    out.push(format!(
        "  Usage: {} (threshold {:.1}%)",
        highlight(cpu, snapshot.cpu_percent > config.cpu.threshold_percent),
        config.cpu.threshold_percent
    ));

    out.push(section_header("Memory"));
    let memory = format!("{:.1}%", snapshot.memory_percent);
    out.push(format!(
        "  Used: {} / {} ({})",
        format_bytes(snapshot.memory_used_bytes),
        format_bytes(snapshot.memory_total_bytes),
        highlight(
            memory,
            snapshot.memory_percent > config.memory.overall_threshold_percent
        )
    ));

    out.push(section_header(&format!("Disk {}", disk_label)));
    let free = format!("{} free", format_bytes(snapshot.disk_free_bytes));
    out.push(format!(
        "  {} / {} total (minimum {:.1} GB)",
        highlight(free, snapshot.disk_free_gb() < config.disk.minimum_free_gb),
        format_bytes(snapshot.disk_total_bytes),
        config.disk.minimum_free_gb
    ));

    out.push(section_header("Top processes by memory"));
    if snapshot.top_processes.is_empty() {
        out.push(format!("  {}", "(unavailable)".dimmed()));
    }
    for (rank, process) in snapshot.top_processes.iter().enumerate() {
        let usage = format!("{:.2} GB", bytes_to_gib(process.memory_used_bytes));
        out.push(format!(
            "  {}. {} (pid {}) {}",
            rank + 1,
            process.name,
            process.pid,
            highlight(
                usage,
                process.memory_used_bytes > config.memory.process_threshold_bytes
            )
        ));
    }

    out.join("\n")
}

/// One-line rendering of an alert event
pub fn format_alert(event: &AlertEvent) -> String {
    format!(
        "[{}] {}: {}",
        event.timestamp.format("%H:%M:%S"),
        event.alert_type.title().yellow().bold(),
        event.message
    )
}

fn section_header(title: &str) -> String {
    format!("\n{}", title.bold().white())
}

fn highlight(value: String, breached: bool) -> ColoredString {
    if breached {
        value.red().bold()
    } else {
        value.green()
    }
}
