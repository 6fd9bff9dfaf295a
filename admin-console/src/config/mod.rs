use console_core::config::{load_settings, ConfigError};
use console_core::observability::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "admin-console";
const ENV_PREFIX: &str = "APP";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub central_api: ApiSettings,
    pub app_api: ApiSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL the endpoint paths are appended to, e.g. `https://auth.example.com/api`.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageSettings {
    /// Session file. Defaults to the user's data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageSettings {
    pub fn session_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_NAME)
                .join("session.json"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Layered settings: `config/base.yaml`, `admin-console.yaml`, an explicit
/// file if given, then `APP_*` environment variables.
pub fn get_configuration(explicit_file: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings(APP_NAME, ENV_PREFIX, explicit_file)
}
