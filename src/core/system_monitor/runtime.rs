//! Tokio runtime and orchestrator for the monitoring loop.
//!
//! Each tick collects a snapshot, runs it through the alert engine and hands
//! the resulting events to the notification sink. Collection blocks, so a
//! cycle runs on the blocking pool while the loop itself only waits on the
//! ticker and the shutdown signal.

use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::alerts::{AlertEngine, AlertEvent};
use super::metrics::{format_bytes, MetricSnapshot};
use super::notifier::NotificationSink;
use super::source::MetricSource;
use crate::core::config::Config;
use crate::error::{MonitorError, Result};

pub type SharedSource = Arc<Mutex<Box<dyn MetricSource>>>;
pub type SharedEngine = Arc<Mutex<AlertEngine>>;

/// Run one collect, evaluate, deliver cycle, using the wall clock as "now"
pub fn run_cycle(
    source: &Mutex<Box<dyn MetricSource>>,
    engine: &Mutex<AlertEngine>,
    sink: &dyn NotificationSink,
) -> Vec<AlertEvent> {
    run_cycle_with_clock(source, engine, sink, Local::now)
}

/// Run one cycle. `clock` is read after collection so quiet hours and
/// cooldowns see the evaluation instant.
///
/// A failed collection skips the cycle without touching engine state. Failed
/// deliveries are logged; the alerts stay recorded for cooldown purposes.
pub fn run_cycle_with_clock<C>(
    source: &Mutex<Box<dyn MetricSource>>,
    engine: &Mutex<AlertEngine>,
    sink: &dyn NotificationSink,
    clock: C,
) -> Vec<AlertEvent>
where
    C: FnOnce() -> DateTime<Local>,
{
    let collected = source.lock().collect();
    let snapshot = match collected {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("Skipping evaluation cycle: {}", e);
            return Vec::new();
        }
    };

    let alerts = engine.lock().evaluate(&snapshot, clock());

    for alert in &alerts {
        log::debug!("Delivering {} alert", alert.alert_type);
        if let Err(e) = sink.send(alert) {
            log::error!("Failed to deliver {} alert: {}", alert.alert_type, e);
        }
    }

    alerts
}

/// Informational event describing the current state of the host
pub fn info_event(snapshot: &MetricSnapshot, disk_label: &str) -> AlertEvent {
    let message = format!(
        "CPU: {:.1}%\nMemory: {:.1}% ({} / {})\nDisk {}: {} free / {} total",
        snapshot.cpu_percent,
        snapshot.memory_percent,
        format_bytes(snapshot.memory_used_bytes),
        format_bytes(snapshot.memory_total_bytes),
        disk_label,
        format_bytes(snapshot.disk_free_bytes),
        format_bytes(snapshot.disk_total_bytes),
    );
    AlertEvent::info(Local::now(), message)
}

/// Background monitoring loop with pause/resume and shutdown control.
pub struct MonitorRuntime {
    source: SharedSource,
    engine: SharedEngine,
    sink: Arc<dyn NotificationSink>,

    /// `true` while monitoring is paused
    paused_tx: watch::Sender<bool>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,

    loop_handle: Option<JoinHandle<()>>,

    /// Owned runtime; dropping it stops any remaining tasks
    runtime: tokio::runtime::Runtime,
}

impl MonitorRuntime {
    /// Build the runtime and start the monitoring loop.
    pub fn start(
        config: &Config,
        source: Box<dyn MetricSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        if config.monitoring_interval == 0 {
            return Err(MonitorError::config("monitoring_interval must be positive"));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("lapmon-worker")
            .build()
            .map_err(|e| MonitorError::runtime(format!("failed to build runtime: {}", e)))?;

        let source: SharedSource = Arc::new(Mutex::new(source));
        let engine: SharedEngine = Arc::new(Mutex::new(AlertEngine::new(config.clone())));
        let (paused_tx, paused_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

        let loop_handle = runtime.spawn(monitor_loop(
            Duration::from_secs(config.monitoring_interval),
            Arc::clone(&source),
            Arc::clone(&engine),
            Arc::clone(&sink),
            paused_rx,
            shutdown_rx,
        ));

        log::info!(
            "Monitoring started, checking every {}s",
            config.monitoring_interval
        );

        Ok(Self {
            source,
            engine,
            sink,
            paused_tx,
            shutdown_tx,
            loop_handle: Some(loop_handle),
            runtime,
        })
    }

    /// Pause monitoring. Returns `false` if it was already paused.
    pub fn pause(&self) -> bool {
        let changed = self.paused_tx.send_if_modified(|paused| !std::mem::replace(paused, true));
        if changed {
            log::info!("Monitoring paused");
        }
        changed
    }

    /// Resume monitoring on the existing loop. Returns `false` if it was not paused.
    pub fn resume(&self) -> bool {
        let changed = self.paused_tx.send_if_modified(|paused| std::mem::replace(paused, false));
        if changed {
            log::info!("Monitoring resumed");
        }
        changed
    }

    pub fn is_paused(&self) -> bool {
        *self.paused_tx.borrow()
    }

    /// Collect a fresh snapshot and deliver it as an informational event.
    ///
    /// Blocks the calling thread for the duration of the collection.
    pub fn show_current(&self) -> Result<AlertEvent> {
        let event = {
            let mut source = self.source.lock();
            let snapshot = source.collect()?;
            info_event(&snapshot, &source.disk_label())
        };

        if let Err(e) = self.sink.send(&event) {
            log::error!("Failed to deliver current metrics: {}", e);
        }
        Ok(event)
    }

    /// Replace the engine config; breach and cooldown tracking restart
    pub fn reload_config(&self, config: Config) {
        self.engine.lock().set_config(config);
        log::info!("Alert configuration reloaded");
    }

    /// Stop the loop and wait for the in-flight cycle, if any.
    pub fn shutdown(mut self) {
        log::info!("Shutting down monitoring");
        // Only fails if the loop already exited
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.loop_handle.take() {
            if let Err(e) = self.runtime.block_on(handle) {
                log::error!("Monitoring loop ended abnormally: {}", e);
            }
        }

        self.runtime.shutdown_timeout(Duration::from_secs(2));
    }
}

async fn monitor_loop(
    period: Duration,
    source: SharedSource,
    engine: SharedEngine,
    sink: Arc<dyn NotificationSink>,
    paused: watch::Receiver<bool>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let is_paused = *paused.borrow();
                if is_paused {
                    log::trace!("Monitoring paused, skipping tick");
                    continue;
                }

                let source = Arc::clone(&source);
                let engine = Arc::clone(&engine);
                let sink = Arc::clone(&sink);
                let cycle = tokio::task::spawn_blocking(move || {
                    run_cycle(&source, &engine, sink.as_ref());
                });

                if let Err(e) = cycle.await {
                    log::error!("Evaluation cycle failed: {}", e);
                }
            }
            _ = shutdown.recv() => {
                log::debug!("Monitoring loop shutting down");
                break;
            }
        }
    }
}
