use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::system_monitor::{CollectorConfig, MetricSource, MetricsCollector};
use crate::core::Config;
use crate::ui::format_snapshot;

/// Collect one snapshot and print it
pub fn execute(matches: &ArgMatches, config: &Config) -> Result<()> {
    let mut collector = MetricsCollector::with_config(CollectorConfig::from_config(config));
    let snapshot = collector
        .collect()
        .context("Failed to collect system metrics")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "{}",
            format_snapshot(&snapshot, config, &collector.disk_label())
        );
    }

    Ok(())
}
