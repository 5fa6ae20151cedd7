//! Logging configuration using the tracing ecosystem.
//!
//! Output goes to a daily-rotated file so the terminal UI is never written
//! over. The level is taken from `RUST_LOG` when set.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "cityadmin=info,warn";

/// Log file name prefix; the appender adds the date.
const LOG_FILE_PREFIX: &str = "cityadmin.log";

/// Initialize the logging system.
///
/// Logs land in the platform local data directory:
/// - Linux: `~/.local/share/cityadmin/logs/`
/// - macOS: `~/Library/Application Support/cityadmin/logs/`
/// - Windows: `C:\Users\<User>\AppData\Local\cityadmin\logs\`
///
/// `RUST_LOG=cityadmin=debug` shows every command and discarded result;
/// `trace` adds form transitions.
///
/// # Errors
///
/// Fails if the log directory cannot be determined or created, or if a
/// global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter_from(std::env::var("RUST_LOG").ok().as_deref()));

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cityadmin starting up");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Build the filter from a `RUST_LOG` value, falling back to the default.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("cityadmin").join("logs"))
}

/// Where log files are written, for display to the user.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}

/// Log a clean shutdown.
pub fn shutdown() {
    tracing::info!("cityadmin shutting down");
}
