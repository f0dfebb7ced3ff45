use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{AppConfig, ConfigManager, LogLevel};

/// Configuration for the logging system
pub struct LogConfig {
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Prefix for log file names
    pub file_prefix: String,
    /// Maximum number of log files to keep (rotation)
    pub max_files: usize,
    /// Write the JSON file log in addition to stdout
    pub log_to_file: bool,
    /// Filter used when RUST_LOG is not set
    pub level: LogLevel,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: ConfigManager::get_log_dir(),
            file_prefix: "desktop-toasts".to_string(),
            max_files: 5,
            log_to_file: true,
            level: LogLevel::Info,
        }
    }
}

impl LogConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_files: config.log_max_files,
            log_to_file: config.log_to_file,
            level: config.log_level,
            ..Default::default()
        }
    }
}

/// Initialize the logging system with file and stdout output
///
/// # Log Targets
/// - `main` - Application lifecycle
/// - `config` - Configuration loading
/// - `toast` - Registration, showing toasts and history
/// - `activation::router` - Activation dispatch
/// - `activation::rendezvous` - UI thread hand-off
/// - `activation::role` - Process role changes
/// - `shellext::*` - COM activator, registry and window
///
/// # Example
/// ```bash
/// RUST_LOG=activation=debug,shellext=trace desktop-toasts
/// ```
pub fn init_logging(config: LogConfig) -> Result<LogGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let (file_layer, worker_guard) = if config.log_to_file {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;

        let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
            .rotation(tracing_appender::rolling::Rotation::DAILY)
            .filename_prefix(&config.file_prefix)
            .filename_suffix("log")
            .max_log_files(config.max_files)
            .build(&config.log_dir)
            .context("Failed to create file appender")?;

        // The guard must outlive every log call
        let (non_blocking_file, worker_guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .json()
            .with_writer(non_blocking_file)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .with_filter(env_filter.clone());

        (Some(file_layer), Some(worker_guard))
    } else {
        (None, None)
    };

    let stdout_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    tracing::info!(
        target: "main",
        log_dir = %config.log_dir.display(),
        max_files = config.max_files,
        log_to_file = config.log_to_file,
        "Logging system initialized"
    );

    Ok(LogGuard {
        _worker_guard: worker_guard,
    })
}

/// Guard that ensures logs are flushed before exit
pub struct LogGuard {
    _worker_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        tracing::info!(target: "main", "Flushing logs before shutdown");
    }
}
