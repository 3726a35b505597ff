use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::info;

use musiccabinet_domain::webservice::DEFAULT_QUARANTINE_DAYS;
use musiccabinet_infrastructure::http::lastfm::DEFAULT_BASE_URL;

pub const API_KEY_ENV: &str = "MUSICCABINET_LASTFM_API_KEY";

const APP_DIR_NAME: &str = "musiccabinet";
const CONFIG_FILE_NAME: &str = "config.json";

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    #[default]
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Persistent configuration, stored as `config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// Defaults to `<data dir>/musiccabinet/musiccabinet.db`
    pub database_path: Option<PathBuf>,
    pub lastfm_api_key: Option<String>,
    pub lastfm_base_url: String,
    pub quarantine_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            database_path: None,
            lastfm_api_key: None,
            lastfm_base_url: DEFAULT_BASE_URL.to_string(),
            quarantine_days: DEFAULT_QUARANTINE_DAYS,
        }
    }
}

/// Application configuration service
pub struct ConfigService {
    config: AppConfig,
    log_level: AtomicU8,
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl ConfigService {
    /// Load from the platform config directory, writing defaults on first run
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Failed to resolve config directory")?
            .join(APP_DIR_NAME);
        let data_dir = dirs::data_dir()
            .context("Failed to resolve data directory")?
            .join(APP_DIR_NAME);
        Self::with_dirs(config_dir, data_dir)
    }

    /// Self-contained setup: config, database and logs all live under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        Self::with_dirs(dir.clone(), dir)
    }

    /// Load from explicit directories
    pub fn with_dirs(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir {:?}", config_dir))?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<AppConfig>(&content)
                .with_context(|| format!("Invalid config file {:?}", config_path))?
        } else {
            let config = AppConfig::default();
            std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
            config
        };

        info!(path = ?config_path, log_level = config.log_level.as_str(), "Config loaded");

        Ok(Self {
            log_level: AtomicU8::new(config.log_level as u8),
            config,
            config_path,
            data_dir: data_dir.into(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn database_path(&self) -> PathBuf {
        self.config
            .database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("musiccabinet.db"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// API key from the environment, falling back to the config file
    pub fn lastfm_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.config.lastfm_api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn lastfm_base_url(&self) -> &str {
        &self.config.lastfm_base_url
    }

    pub fn quarantine_period(&self) -> chrono::Duration {
        chrono::Duration::days(self.config.quarantine_days.max(0))
    }

    pub fn get_log_level(&self) -> LogLevel {
        LogLevel::from_u8(self.log_level.load(Ordering::Relaxed))
    }

    /// Set log level and persist it; takes effect on next start
    pub fn set_log_level(&self, level: LogLevel) -> Result<()> {
        self.log_level.store(level as u8, Ordering::Relaxed);

        let config = AppConfig {
            log_level: level,
            ..self.config.clone()
        };
        std::fs::write(&self.config_path, serde_json::to_string_pretty(&config)?)?;

        info!(level = level.as_str(), path = ?self.config_path, "Log level saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::from_u8(1), LogLevel::Error);
        assert_eq!(LogLevel::from_u8(5), LogLevel::Trace);
        assert_eq!(LogLevel::from_u8(99), LogLevel::Info);
    }

    #[test]
    fn test_defaults_written_on_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::with_dirs(dir.path().join("config"), dir.path()).unwrap();

        assert!(service.config_path().exists());
        assert_eq!(service.config(), &AppConfig::default());
        assert_eq!(service.database_path(), dir.path().join("musiccabinet.db"));
        assert_eq!(service.quarantine_period(), chrono::Duration::days(7));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"quarantine_days": 3, "log_level": "debug"}"#,
        )
        .unwrap();

        let service = ConfigService::with_dirs(dir.path(), dir.path()).unwrap();
        assert_eq!(service.quarantine_period(), chrono::Duration::days(3));
        assert_eq!(service.get_log_level(), LogLevel::Debug);
        assert_eq!(service.lastfm_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_set_log_level_persists() {
        let dir = tempfile::tempdir().unwrap();
        let service = ConfigService::with_dirs(dir.path(), dir.path()).unwrap();
        service.set_log_level(LogLevel::Trace).unwrap();

        let reloaded = ConfigService::with_dirs(dir.path(), dir.path()).unwrap();
        assert_eq!(reloaded.get_log_level(), LogLevel::Trace);
    }

    #[test]
    fn test_in_dir_keeps_data_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("cabinet");
        let service = ConfigService::in_dir(&root).unwrap();

        assert_eq!(service.config_path(), root.join(CONFIG_FILE_NAME));
        assert_eq!(service.database_path(), root.join("musiccabinet.db"));
        assert_eq!(service.log_dir(), root.join("logs"));
    }
}
