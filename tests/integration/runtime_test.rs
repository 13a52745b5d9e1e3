use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;

use lapmon::core::system_monitor::{
    run_cycle_with_clock, AlertEngine, AlertEvent, AlertType, EngineState, MetricSnapshot,
    MetricSource, MonitorRuntime, NotificationSink,
};
use lapmon::{Config, MonitorError};

const GIB: u64 = 1024 * 1024 * 1024;

fn noon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 14, 12, 0, 0)
        .single()
        .unwrap()
}

fn low_disk(at: DateTime<Local>) -> MetricSnapshot {
    MetricSnapshot {
        memory_total_bytes: 16 * GIB,
        disk_free_bytes: GIB,
        disk_total_bytes: 100 * GIB,
        ..MetricSnapshot::empty(at)
    }
}

/// Returns the queued snapshots in order, failing once they run out
struct ScriptedSource {
    snapshots: Vec<MetricSnapshot>,
    calls: Arc<Mutex<usize>>,
}

impl MetricSource for ScriptedSource {
    fn collect(&mut self) -> lapmon::Result<MetricSnapshot> {
        *self.calls.lock() += 1;
        if self.snapshots.is_empty() {
            return Err(MonitorError::metric_collection("sensor offline"));
        }
        Ok(self.snapshots.remove(0))
    }

    fn disk_label(&self) -> String {
        "/".to_string()
    }
}

/// Always reports a low disk, stamped with the wall clock
struct LowDiskSource {
    calls: Arc<Mutex<usize>>,
}

impl MetricSource for LowDiskSource {
    fn collect(&mut self) -> lapmon::Result<MetricSnapshot> {
        *self.calls.lock() += 1;
        Ok(low_disk(Local::now()))
    }

    fn disk_label(&self) -> String {
        "/data".to_string()
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<AlertEvent>>,
}

impl NotificationSink for CollectingSink {
    fn send(&self, event: &AlertEvent) -> lapmon::Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

struct FailingSink;

impl NotificationSink for FailingSink {
    fn send(&self, _event: &AlertEvent) -> lapmon::Result<()> {
        Err(MonitorError::notification("no display"))
    }
}

fn scripted(snapshots: Vec<MetricSnapshot>) -> Mutex<Box<dyn MetricSource>> {
    Mutex::new(Box::new(ScriptedSource {
        snapshots,
        calls: Arc::new(Mutex::new(0)),
    }))
}

fn always_awake() -> Config {
    let mut config = Config::default();
    config.monitoring_interval = 1;
    config.cooldown.quiet_hours_start = String::new();
    config.cooldown.quiet_hours_end = String::new();
    config
}

#[test]
fn test_cycle_delivers_alerts_to_sink() {
    let source = scripted(vec![low_disk(noon())]);
    let engine = Mutex::new(AlertEngine::new(Config::default()));
    let sink = CollectingSink::default();

    let alerts = run_cycle_with_clock(&source, &engine, &sink, noon);

    assert_eq!(alerts.len(), 1);
    let delivered = sink.events.lock();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].alert_type, AlertType::Disk);
}

#[test]
fn test_failed_collection_leaves_state_untouched() {
    let source = scripted(Vec::new());
    let engine = Mutex::new(AlertEngine::new(Config::default()));
    let sink = CollectingSink::default();

    let alerts = run_cycle_with_clock(&source, &engine, &sink, noon);

    assert!(alerts.is_empty());
    assert!(sink.events.lock().is_empty());
    assert_eq!(engine.lock().state(), &EngineState::new());
}

#[test]
fn test_failed_delivery_still_starts_cooldown() {
    let later = noon() + chrono::Duration::minutes(1);
    let source = scripted(vec![low_disk(noon()), low_disk(later)]);
    let engine = Mutex::new(AlertEngine::new(Config::default()));

    let first = run_cycle_with_clock(&source, &engine, &FailingSink, noon);
    assert_eq!(first.len(), 1);
    assert_eq!(
        engine.lock().state().last_alert_time(AlertType::Disk),
        Some(noon())
    );

    let second = run_cycle_with_clock(&source, &engine, &FailingSink, || later);
    assert!(second.is_empty());
}

#[test]
fn test_runtime_rejects_zero_interval() {
    let mut config = always_awake();
    config.monitoring_interval = 0;
    let source = Box::new(LowDiskSource {
        calls: Arc::new(Mutex::new(0)),
    });

    let result = MonitorRuntime::start(&config, source, Arc::new(CollectingSink::default()));
    assert!(matches!(result, Err(MonitorError::Config(_))));
}

/// Poll `condition` until it holds or `timeout` elapses
fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}

#[test]
fn test_runtime_pause_resume_and_shutdown() {
    let calls = Arc::new(Mutex::new(0));
    let sink = Arc::new(CollectingSink::default());
    let runtime = MonitorRuntime::start(
        &always_awake(),
        Box::new(LowDiskSource {
            calls: Arc::clone(&calls),
        }),
        sink.clone(),
    )
    .unwrap();

    // The first tick fires immediately
    assert!(wait_until(Duration::from_secs(10), || sink.events.lock().len() == 1));

    assert!(runtime.pause());
    assert!(!runtime.pause());
    assert!(runtime.is_paused());

    // Let a cycle that slipped in before the pause finish
    std::thread::sleep(Duration::from_millis(500));
    let paused_at = *calls.lock();
    std::thread::sleep(Duration::from_millis(2500));
    assert_eq!(*calls.lock(), paused_at);

    assert!(runtime.resume());
    assert!(!runtime.resume());
    assert!(!runtime.is_paused());
    assert!(wait_until(Duration::from_secs(10), || *calls.lock() > paused_at));

    let event = runtime.show_current().unwrap();
    assert_eq!(event.alert_type, AlertType::Info);
    assert!(event.message.contains("Disk /data"));

    // Disk alert is still cooling down, only the info event was added
    let events = sink.events.lock().clone();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].alert_type, AlertType::Info);

    runtime.shutdown();
}
