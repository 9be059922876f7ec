// ABOUTME: Logging setup for the topos binary
//
// Standard output carries command results, so logs go to a daily JSON Lines
// file under ~/.topos/logs. RUST_LOG overrides the default filter.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ToposConfig;

/// Filter used when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "topos=info";

/// Directory holding the JSONL log files
pub fn log_dir() -> PathBuf {
    ToposConfig::get_user_config_dir()
        .map_or_else(|_| PathBuf::from(".topos/logs"), |dir| dir.join("logs"))
}

/// Log file for today, e.g. `topos-20261019.jsonl`
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("topos-{}.jsonl", date.format("%Y%m%d"))
}

/// Install the global tracing subscriber.
///
/// Falls back to warnings on stderr when the log file cannot be opened.
pub fn setup_logging() {
    let log_dir = log_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    let log_file = log_dir.join(log_file_name(chrono::Local::now().date_naive()));

    match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json() // Output in JSON Lines format
                        .with_target(true)
                        .with_writer(file)
                        .with_ansi(false),
                )
                .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
                .init();
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .with(EnvFilter::new("topos=warn"))
                .init();
            tracing::warn!(path = %log_file.display(), error = %e, "Could not open log file");
        }
    }
}
