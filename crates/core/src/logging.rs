use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "agent-monitor.log";

/// Default filter when `RUST_LOG` is unset: `level` for the monitor's own
/// crates, warnings for everything else.
pub fn default_filter(level: &str) -> String {
    format!("warn,glpi_agent_monitor={level},glpi_monitor_core={level},glpi_monitor_windows={level}")
}

/// Daily rolling log file in `dir`, creating the directory first.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
        .with_context(|| format!("opening log file in {}", dir.display()))
}

/// Install the global subscriber.
///
/// With `log_dir` set and `config.to_file` enabled, events go to a daily
/// rolling file there (the tray app has no console); otherwise, or when the
/// file can't be opened, to stderr.  The returned guard flushes the file
/// writer and must be held until exit.
pub fn init(config: &LogConfig, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.level)));

    let appender = match log_dir.filter(|_| config.to_file).map(file_appender) {
        Some(Ok(appender)) => Some(appender),
        Some(Err(e)) => {
            eprintln!("logging to stderr: {e:#}");
            None
        }
        None => None,
    };

    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .try_init();
            None
        }
    }
}
