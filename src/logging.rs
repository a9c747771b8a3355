use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::utils::error::{AppError, Result};

/// Routes `tracing` output to a daily rotated log file in the app directory.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// flushes buffered lines when dropped and must live until the process exits.
pub fn init(config: &AppConfig) -> Result<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.log_file)
        .max_log_files(config.log_max_files)
        .build(config.app_dir())?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    Ok(guard)
}
