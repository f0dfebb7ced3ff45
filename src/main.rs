#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use desktop_toasts::activation::role::LaunchOptions;
use desktop_toasts::{AppConfig, ConfigManager, LogConfig, logging};

fn main() -> Result<()> {
    let config_manager = ConfigManager::load().context("Failed to load configuration")?;
    let config = config_manager.get_config();

    // Keep the guard alive until the exit code is known
    let log_guard = logging::init_logging(LogConfig::from_config(&config))
        .context("Failed to initialize logging system")?;

    if let Err(e) = config_manager.ensure_persisted() {
        tracing::warn!(target: "main", error = %e, "Failed to write default configuration");
    }

    desktop_toasts::init_locale(config_manager.language());

    let options = LaunchOptions::parse(std::env::args().skip(1));
    tracing::info!(target: "main", ?options, "Starting Desktop Toasts...");

    let exit_code = run(&config, options)?;

    tracing::info!(target: "main", exit_code, "Shutdown complete");
    drop(log_guard);
    std::process::exit(exit_code);
}

#[cfg(windows)]
fn run(config: &AppConfig, options: LaunchOptions) -> Result<i32> {
    desktop_toasts::shellext::run(config, options)
}

#[cfg(not(windows))]
fn run(_config: &AppConfig, _options: LaunchOptions) -> Result<i32> {
    Err(desktop_toasts::PlatformError::Unsupported.into())
}
