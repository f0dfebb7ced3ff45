use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

use crate::toast::platform::AppIdentity;

/// CLSID of the activation COM class unless configured otherwise.
pub const DEFAULT_ACTIVATOR_CLSID: Uuid = Uuid::from_u128(0x23a5b06e_20bb_4e7e_a0ac_6982ed6a6041);

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Application configuration stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application User Model ID toasts are sent under
    pub app_id: String,
    /// Name shown on toasts and in the action center
    pub display_name: String,
    /// Optional icon registered with the AUMID
    pub icon_path: Option<String>,
    /// CLSID the platform launches to deliver activations
    pub activator_clsid: Uuid,
    /// Correlation id carried in the sample toast's arguments
    pub conversation_id: u32,
    /// Upper bound on waiting for the UI thread. None waits indefinitely.
    pub rendezvous_timeout_ms: Option<u64>,
    /// Whether to write logs to file
    pub log_to_file: bool,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: LogLevel,
    /// Maximum number of log files to keep
    pub log_max_files: usize,
    /// Language/locale setting (e.g., "en-US", "zh-CN"). None means use system default.
    pub language: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "WindowsNotifications.DesktopToastsRust".to_string(),
            display_name: "Desktop Toasts Sample".to_string(),
            icon_path: None,
            activator_clsid: DEFAULT_ACTIVATOR_CLSID,
            conversation_id: 9813,
            rendezvous_timeout_ms: None,
            log_to_file: true,
            log_level: LogLevel::Info,
            log_max_files: 5,
            language: None,
        }
    }
}

impl AppConfig {
    pub fn identity(&self) -> AppIdentity {
        AppIdentity {
            app_id: self.app_id.clone(),
            display_name: self.display_name.clone(),
            icon_path: self.icon_path.clone(),
            activator_clsid: self.activator_clsid,
        }
    }

    pub fn rendezvous_timeout(&self) -> Option<Duration> {
        self.rendezvous_timeout_ms.map(Duration::from_millis)
    }
}

/// Thread-safe configuration manager that persists settings to JSON
pub struct ConfigManager {
    config: RwLock<AppConfig>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Loads `~/.desktop-toasts/config.json`.
    pub fn load() -> Result<Self> {
        Self::load_at(Self::get_config_path()?)
    }

    pub fn load_at(config_path: PathBuf) -> Result<Self> {
        let config = Self::load_from_path(&config_path)?;
        Ok(Self {
            config: RwLock::new(config),
            config_path,
        })
    }

    /// Base directory for the config file and logs (~/.desktop-toasts)
    pub fn get_app_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".desktop-toasts")
    }

    fn get_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to get user home directory")?;
        Ok(home_dir.join(".desktop-toasts").join("config.json"))
    }

    /// Load configuration from the specified path, using defaults for missing fields
    fn load_from_path(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::info!(target: "config", path = %path.display(), "Config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config file")?;

        tracing::info!(target: "config", path = %path.display(), "Loaded configuration from file");

        Ok(config)
    }

    /// Writes the defaults out on first start so they can be edited.
    pub fn ensure_persisted(&self) -> Result<()> {
        if self.config_path.exists() {
            return Ok(());
        }
        self.save()
    }

    /// Save the current configuration to disk
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let config = self
            .config
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire read lock on config: {}", e))?;

        let content =
            serde_json::to_string_pretty(&*config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config file")?;

        tracing::debug!(target: "config", path = %self.config_path.display(), "Configuration saved");

        Ok(())
    }

    /// Get the current configuration (cloned)
    pub fn get_config(&self) -> AppConfig {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|_| AppConfig::default())
    }

    /// Update the configuration with a closure and persist to disk
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        {
            let mut config = self
                .config
                .write()
                .map_err(|e| anyhow::anyhow!("Failed to acquire write lock on config: {}", e))?;
            f(&mut config);
        }
        self.save()
    }

    pub fn language(&self) -> Option<String> {
        self.config.read().ok().and_then(|c| c.language.clone())
    }

    pub fn get_log_dir() -> PathBuf {
        Self::get_app_dir().join("logs")
    }
}
