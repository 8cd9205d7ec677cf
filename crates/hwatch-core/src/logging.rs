//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Initialize the logging subsystem
///
/// Logs are written to `<data dir>/homewatch/logs/`.
/// Log level is controlled by the `HWATCH_LOG` environment variable.
///
/// # Examples
/// ```bash
/// HWATCH_LOG=debug hwatch
/// HWATCH_LOG=trace hwatch
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "hwatch.log");

    // Default to info, allow override via HWATCH_LOG
    let env_filter = EnvFilter::try_from_env("HWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("homewatch=info,hwatch_core=info,hwatch_transport=info,hwatch_app=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("HomeWatch starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("homewatch").join("logs")
}

/// Get the log file path for the current day
pub fn current_log_file() -> PathBuf {
    get_log_directory().join("hwatch.log")
}
