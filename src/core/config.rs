use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MonitorError;

const GIB: u64 = 1024 * 1024 * 1024;

/// Top-level configuration, persisted as YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between two evaluation cycles
    pub monitoring_interval: u64,
    pub cpu: CpuAlertConfig,
    pub memory: MemoryAlertConfig,
    pub disk: DiskAlertConfig,
    pub cooldown: CooldownConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuAlertConfig {
    pub enabled: bool,
    pub threshold_percent: f64,
    /// How long CPU must stay above the threshold before alerting
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryAlertConfig {
    /// Controls both the overall and the per-process check
    pub enabled: bool,
    pub overall_threshold_percent: f64,
    pub process_threshold_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskAlertConfig {
    pub enabled: bool,
    pub minimum_free_gb: f64,
    /// Path on the monitored volume
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub duration_minutes: u64,
    /// "HH:MM", local time
    pub quiet_hours_start: String,
    /// "HH:MM", local time
    pub quiet_hours_end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub level: String,
    /// Log file; stderr when unset
    pub file: Option<PathBuf>,
    pub max_file_size_mb: u64,
    pub max_backups: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitoring_interval: 5,
            cpu: CpuAlertConfig::default(),
            memory: MemoryAlertConfig::default(),
            disk: DiskAlertConfig::default(),
            cooldown: CooldownConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CpuAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_percent: 85.0,
            duration_seconds: 30,
        }
    }
}

impl Default for MemoryAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overall_threshold_percent: 90.0,
            process_threshold_bytes: 4 * GIB,
        }
    }
}

impl Default for DiskAlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_free_gb: 20.0,
            path: default_disk_path().to_string(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 5,
            quiet_hours_start: "23:00".to_string(),
            quiet_hours_end: "07:00".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 10,
            max_backups: 3,
        }
    }
}

#[cfg(windows)]
fn default_disk_path() -> &'static str {
    "C:\\"
}

#[cfg(not(windows))]
fn default_disk_path() -> &'static str {
    "/"
}

impl Config {
    /// Load the config from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load the config from `path`. A missing file yields the defaults, which
    /// are written back so the user has something to edit.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            if let Err(e) = config.save_to(path) {
                log::warn!("Could not write default config to {:?}: {:#}", path, e);
            }
            return Ok(config);
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = if data.trim().is_empty() {
            Config::default()
        } else {
            Self::from_yaml_str(&data)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    /// Parse YAML, filling any missing field from the defaults
    pub fn from_yaml_str(data: &str) -> crate::Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn to_yaml_string(&self) -> crate::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = self
            .to_yaml_string()
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("lapmon").join("config.yaml"))
    }

    /// Loader-level sanity checks. The alert engine itself accepts any config.
    pub fn validate(&self) -> crate::Result<()> {
        if self.monitoring_interval == 0 {
            return Err(MonitorError::config(
                "monitoring_interval must be at least 1 second",
            ));
        }

        let thresholds = [
            ("cpu.threshold_percent", self.cpu.threshold_percent),
            (
                "memory.overall_threshold_percent",
                self.memory.overall_threshold_percent,
            ),
            ("disk.minimum_free_gb", self.disk.minimum_free_gb),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() {
                return Err(MonitorError::config(format!("{} must be a finite number", name)));
            }
        }

        Ok(())
    }
}
