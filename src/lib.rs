// lapmon Library - Public API

// Re-export error types
pub mod error;
pub use error::{MonitorError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;

use std::str::FromStr;

use log::LevelFilter;

// Re-export commonly used types
pub use core::config::{Config, LoggingConfig};

/// Initialize logging from the `logging` section of the config.
///
/// `RUST_LOG` still takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = if config.enabled {
        LevelFilter::from_str(config.level.trim()).ok()
    } else {
        Some(LevelFilter::Off)
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level.unwrap_or(LevelFilter::Info))
        .parse_env(env_logger::Env::default());

    let mut rotated = false;
    if let (true, Some(path)) = (config.enabled, config.file.as_ref()) {
        let max_bytes = config.max_file_size_mb.saturating_mul(1024 * 1024);
        rotated = utils::log_files::rotate_if_needed(path, max_bytes, config.max_backups)?;
        let file = utils::log_files::open_log_file(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| MonitorError::other(format!("Failed to initialize logging: {}", e)))?;

    if level.is_none() {
        log::warn!("Unknown log level {:?}, using info", config.level);
    }
    if rotated {
        log::info!("Rotated previous log file");
    }

    Ok(())
}
