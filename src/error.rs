use std::io;
use thiserror::Error;

/// Custom error type for lapmon
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for lapmon
pub type Result<T> = std::result::Result<T, MonitorError>;

impl MonitorError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MonitorError::Config(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        MonitorError::MetricCollection(msg.into())
    }

    pub fn notification<S: Into<String>>(msg: S) -> Self {
        MonitorError::Notification(msg.into())
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        MonitorError::Runtime(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        MonitorError::Other(msg.into())
    }
}
