//! Notification sinks for alert events.

use std::io::{self, Write};

use colored::*;
use parking_lot::Mutex;

use super::alerts::{AlertEvent, AlertType};
use crate::error::{MonitorError, Result};

/// Trait for alert delivery
pub trait NotificationSink: Send + Sync {
    /// Deliver one event to the user
    fn send(&self, event: &AlertEvent) -> Result<()>;
}

/// Prints alerts to stdout with a coloured title per alert type
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    // Keeps concurrent deliveries from interleaving lines
    lock: Mutex<()>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for ConsoleNotifier {
    fn send(&self, event: &AlertEvent) -> Result<()> {
        let _guard = self.lock.lock();
        log_event(event);

        let mut stdout = io::stdout().lock();
        write_event(&mut stdout, event)
            .map_err(|e| MonitorError::notification(format!("stdout: {}", e)))
    }
}

fn write_event<W: Write>(out: &mut W, event: &AlertEvent) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        styled_title(event.alert_type)
    )?;
    for line in event.message.lines() {
        writeln!(out, "    {}", line)?;
    }
    out.flush()
}

/// Only writes alerts to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn send(&self, event: &AlertEvent) -> Result<()> {
        log_event(event);
        Ok(())
    }
}

fn log_event(event: &AlertEvent) {
    match event.alert_type {
        AlertType::Info => log::info!("{}: {}", event.alert_type.title(), event.message),
        _ => log::warn!("Alert [{}]: {}", event.alert_type, event.message),
    }
}

fn styled_title(alert_type: AlertType) -> ColoredString {
    let title = alert_type.title();
    match alert_type {
        AlertType::Cpu | AlertType::MemoryOverall => title.red().bold(),
        AlertType::MemoryProcess => title.yellow().bold(),
        AlertType::Disk => title.magenta().bold(),
        AlertType::Info => title.cyan().bold(),
    }
}
