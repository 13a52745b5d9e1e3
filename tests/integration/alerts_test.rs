use chrono::{DateTime, Duration, Local, TimeZone};
use lapmon::core::system_monitor::{
    evaluate_alerts, AlertEngine, AlertType, EngineState, MetricSnapshot, ProcessMetric,
};
use lapmon::Config;

const GIB: u64 = 1024 * 1024 * 1024;

fn noon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 14, 12, 0, 0)
        .single()
        .unwrap()
}

fn quiet_snapshot(at: DateTime<Local>) -> MetricSnapshot {
    MetricSnapshot {
        cpu_percent: 10.0,
        memory_used_bytes: 4 * GIB,
        memory_total_bytes: 16 * GIB,
        memory_percent: 25.0,
        disk_free_bytes: 200 * GIB,
        disk_total_bytes: 500 * GIB,
        ..MetricSnapshot::empty(at)
    }
}

fn with_cpu(at: DateTime<Local>, cpu: f64) -> MetricSnapshot {
    MetricSnapshot {
        cpu_percent: cpu,
        ..quiet_snapshot(at)
    }
}

#[test]
fn test_healthy_host_raises_nothing() {
    let mut state = EngineState::new();
    let alerts = evaluate_alerts(&Config::default(), &mut state, &quiet_snapshot(noon()), noon());
    assert!(alerts.is_empty());
    assert_eq!(state, EngineState::new());
}

#[test]
fn test_cpu_alerts_only_after_sustained_breach() {
    let mut config = Config::default();
    config.cpu.duration_seconds = 30;
    let mut engine = AlertEngine::new(config);
    let t0 = noon();

    assert!(engine.evaluate(&with_cpu(t0, 95.0), t0).is_empty());
    let t15 = t0 + Duration::seconds(15);
    assert!(engine.evaluate(&with_cpu(t15, 95.0), t15).is_empty());

    let t30 = t0 + Duration::seconds(30);
    let alerts = engine.evaluate(&with_cpu(t30, 95.0), t30);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::Cpu);
    assert_eq!(alerts[0].message, "CPU exceeded 85.0% (current: 95.0%)");
    assert_eq!(alerts[0].timestamp, t30);
}

#[test]
fn test_cpu_dip_restarts_breach_window() {
    let mut config = Config::default();
    config.cpu.duration_seconds = 30;
    let mut engine = AlertEngine::new(config);
    let t0 = noon();

    engine.evaluate(&with_cpu(t0, 95.0), t0);
    let t20 = t0 + Duration::seconds(20);
    engine.evaluate(&with_cpu(t20, 50.0), t20);
    assert!(engine.state().cpu_breach_start.is_none());

    let t25 = t0 + Duration::seconds(25);
    assert!(engine.evaluate(&with_cpu(t25, 95.0), t25).is_empty());
    let t40 = t0 + Duration::seconds(40);
    assert!(engine.evaluate(&with_cpu(t40, 95.0), t40).is_empty());
    let t55 = t0 + Duration::seconds(55);
    assert_eq!(engine.evaluate(&with_cpu(t55, 95.0), t55).len(), 1);
}

#[test]
fn test_cpu_exactly_at_threshold_is_not_a_breach() {
    let mut config = Config::default();
    config.cpu.duration_seconds = 0;
    let mut state = EngineState::new();
    let alerts = evaluate_alerts(&config, &mut state, &with_cpu(noon(), 85.0), noon());
    assert!(alerts.is_empty());
    assert!(state.cpu_breach_start.is_none());
}

#[test]
fn test_cooldown_suppresses_repeat_alerts_per_type() {
    let mut engine = AlertEngine::new(Config::default());
    let t0 = noon();
    let high_memory = |at| MetricSnapshot {
        memory_percent: 95.0,
        ..quiet_snapshot(at)
    };

    assert_eq!(engine.evaluate(&high_memory(t0), t0).len(), 1);

    let t4 = t0 + Duration::minutes(4);
    assert!(engine.evaluate(&high_memory(t4), t4).is_empty());

    // Cooldown is per type: disk can still fire
    let low_disk = MetricSnapshot {
        memory_percent: 95.0,
        disk_free_bytes: 5 * GIB,
        ..quiet_snapshot(t4)
    };
    let alerts = engine.evaluate(&low_disk, t4);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::Disk);

    let t5 = t0 + Duration::minutes(5);
    let alerts = engine.evaluate(&high_memory(t5), t5);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::MemoryOverall);
}

#[test]
fn test_alerts_come_out_in_fixed_order() {
    let mut config = Config::default();
    config.cpu.duration_seconds = 0;
    let snapshot = MetricSnapshot {
        cpu_percent: 99.0,
        memory_percent: 97.0,
        disk_free_bytes: GIB,
        top_processes: vec![ProcessMetric {
            pid: 42,
            name: "java".to_string(),
            memory_used_bytes: 6 * GIB,
        }],
        ..quiet_snapshot(noon())
    };

    let alerts = evaluate_alerts(&config, &mut EngineState::new(), &snapshot, noon());
    let kinds: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
    assert_eq!(
        kinds,
        vec![
            AlertType::Cpu,
            AlertType::MemoryOverall,
            AlertType::MemoryProcess,
            AlertType::Disk
        ]
    );
    assert_eq!(alerts[2].message, "java using 6.0 GB (threshold 4.0 GB)");
    assert_eq!(alerts[2].process_pid, Some(42));
    assert_eq!(alerts[3].message, "Disk free space below 20.0 GB (current: 1.0 GB)");
}

#[test]
fn test_only_first_heavy_process_is_reported() {
    let snapshot = MetricSnapshot {
        top_processes: vec![
            ProcessMetric {
                pid: 1,
                name: "first".to_string(),
                memory_used_bytes: 8 * GIB,
            },
            ProcessMetric {
                pid: 2,
                name: "second".to_string(),
                memory_used_bytes: 5 * GIB,
            },
        ],
        ..quiet_snapshot(noon())
    };

    let alerts = evaluate_alerts(&Config::default(), &mut EngineState::new(), &snapshot, noon());
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].process_name.as_deref(), Some("first"));
}

#[test]
fn test_quiet_hours_suppress_and_preserve_state() {
    let night = Local
        .with_ymd_and_hms(2024, 3, 14, 23, 30, 0)
        .single()
        .unwrap();
    let mut config = Config::default();
    config.cpu.duration_seconds = 0;
    let mut state = EngineState::new();

    let snapshot = MetricSnapshot {
        memory_percent: 99.0,
        ..with_cpu(night, 99.0)
    };
    assert!(evaluate_alerts(&config, &mut state, &snapshot, night).is_empty());
    assert_eq!(state, EngineState::new());
}

#[test]
fn test_disabled_checks_never_fire() {
    let mut config = Config::default();
    config.cpu.enabled = false;
    config.memory.enabled = false;
    config.disk.enabled = false;
    config.cpu.duration_seconds = 0;

    let snapshot = MetricSnapshot {
        cpu_percent: 100.0,
        memory_percent: 100.0,
        disk_free_bytes: 0,
        top_processes: vec![ProcessMetric {
            pid: 7,
            name: "hog".to_string(),
            memory_used_bytes: 64 * GIB,
        }],
        ..quiet_snapshot(noon())
    };

    let alerts = evaluate_alerts(&config, &mut EngineState::new(), &snapshot, noon());
    assert!(alerts.is_empty());
}

#[test]
fn test_reloading_config_resets_tracking() {
    let mut engine = AlertEngine::new(Config::default());
    let low_disk = MetricSnapshot {
        disk_free_bytes: GIB,
        ..quiet_snapshot(noon())
    };
    assert_eq!(engine.evaluate(&low_disk, noon()).len(), 1);
    assert!(engine.state().last_alert_time(AlertType::Disk).is_some());

    engine.set_config(Config::default());
    assert!(engine.state().last_alert_time(AlertType::Disk).is_none());
    assert_eq!(engine.evaluate(&low_disk, noon()).len(), 1);
}

#[test]
fn test_memory_and_disk_thresholds_are_strict() {
    let config = Config::default();
    let mut state = EngineState::new();

    let memory_at_limit = MetricSnapshot {
        memory_percent: config.memory.overall_threshold_percent,
        ..quiet_snapshot(noon())
    };
    assert!(evaluate_alerts(&config, &mut state, &memory_at_limit, noon()).is_empty());

    // 20 GiB free against a 20 GB minimum
    let disk_at_limit = MetricSnapshot {
        disk_free_bytes: 20 * GIB,
        ..quiet_snapshot(noon())
    };
    assert!(evaluate_alerts(&config, &mut state, &disk_at_limit, noon()).is_empty());
    assert_eq!(state, EngineState::new());
}

#[test]
fn test_unreadable_memory_percent_does_not_alert() {
    let snapshot = MetricSnapshot {
        memory_percent: f64::NAN,
        ..quiet_snapshot(noon())
    };
    let mut state = EngineState::new();

    assert!(evaluate_alerts(&Config::default(), &mut state, &snapshot, noon()).is_empty());
    assert_eq!(state.last_alert_time(AlertType::MemoryOverall), None);
}

#[test]
fn test_quiet_hours_accept_seconds() {
    let night = Local
        .with_ymd_and_hms(2024, 3, 14, 23, 30, 0)
        .single()
        .unwrap();
    let mut config = Config::default();
    config.cooldown.quiet_hours_start = "23:00:00".to_string();
    config.cooldown.quiet_hours_end = "07:00:00".to_string();

    let snapshot = MetricSnapshot {
        memory_percent: 99.0,
        ..quiet_snapshot(night)
    };
    assert!(evaluate_alerts(&config, &mut EngineState::new(), &snapshot, night).is_empty());
}
