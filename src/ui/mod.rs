// UI and formatting module

pub mod messages;
pub mod snapshot_formatters;

// Re-export commonly used items for cleaner imports
pub use messages::{dimmed, error, info, success, warn};
pub use snapshot_formatters::{format_alert, format_snapshot};
