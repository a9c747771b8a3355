use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::utils::error::{AppError, Result};
use crate::utils::json_file;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_PRODUCT_LIST_FILE: &str = "product-list.json";
pub const DEFAULT_CACHE_FILE: &str = "state.json";
pub const DEFAULT_LOG_FILE: &str = "check-price.log";
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_LOG_MAX_FILES: usize = 5;

/// Where the run reads and writes its files, and how it logs.
///
/// Every field has a default; `PRICE_CHECK__<FIELD>` environment variables
/// override them (e.g. `PRICE_CHECK__APP_DIR=/srv/prices`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the settings, product list, cache and log.
    /// Resolved to the executable's directory when unset.
    #[serde(default)]
    pub app_dir: Option<PathBuf>,
    pub config_file: String,
    pub product_list_file: String,
    pub cache_file: String,
    pub log_file: String,
    pub log_level: String,
    pub log_max_files: usize,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_dir: None,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            product_list_file: DEFAULT_PRODUCT_LIST_FILE.to_string(),
            cache_file: DEFAULT_CACHE_FILE.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_max_files: DEFAULT_LOG_MAX_FILES,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_environment(
            Environment::with_prefix("PRICE_CHECK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
    }

    pub fn from_environment(environment: Environment) -> std::result::Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("config_file", DEFAULT_CONFIG_FILE)?
            .set_default("product_list_file", DEFAULT_PRODUCT_LIST_FILE)?
            .set_default("cache_file", DEFAULT_CACHE_FILE)?
            .set_default("log_file", DEFAULT_LOG_FILE)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?
            .set_default("log_max_files", DEFAULT_LOG_MAX_FILES as i64)?
            .add_source(environment)
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let files = [
            ("config_file", &self.config_file),
            ("product_list_file", &self.product_list_file),
            ("cache_file", &self.cache_file),
            ("log_file", &self.log_file),
        ];
        for (name, value) in files {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{} must not be empty", name)));
            }
        }

        if self.log_max_files == 0 {
            return Err(ConfigError::Message("log_max_files must be greater than 0".into()));
        }

        if EnvFilter::try_new(&self.log_level).is_err() {
            return Err(ConfigError::Message(format!("Invalid log_level directive: {}", self.log_level)));
        }

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::Message("request_timeout_secs must be greater than 0".into()));
        }

        Ok(())
    }

    /// Fills `app_dir` with the directory of the running executable when unset.
    pub fn resolve_app_dir(mut self) -> Result<Self> {
        if self.app_dir.is_none() {
            let exe = env::current_exe()?;
            let dir = exe
                .parent()
                .ok_or_else(|| AppError::Validation(format!("Executable has no parent directory: {}", exe.display())))?;
            self.app_dir = Some(dir.to_path_buf());
        }
        Ok(self)
    }

    pub fn app_dir(&self) -> &Path {
        self.app_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    pub fn config_path(&self) -> PathBuf {
        self.app_dir().join(&self.config_file)
    }

    pub fn product_list_path(&self) -> PathBuf {
        self.app_dir().join(&self.product_list_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.app_dir().join(&self.cache_file)
    }
}

/// Free-form key-value settings read from `config.json`.
///
/// Keys are usually dotted (`slack.url`). A key is looked up literally first,
/// then as a path through nested objects, so both `{"slack.url": ..}` and
/// `{"slack": {"url": ..}}` work.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let values = json_file::read_optional::<Map<String, Value>>(path)?.unwrap_or_default();
        Ok(Self { values })
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(AppError::Validation(format!("Settings must be a JSON object, got {}", other))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(key) {
            return Some(value);
        }

        let mut parts = key.split('.');
        let mut current = self.values.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }
}
