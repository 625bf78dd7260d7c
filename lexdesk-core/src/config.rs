//! Configuration loading, saving and validation

use crate::error::{ErrorContext, LexError, LexResult};
use crate::types::{LexConfig, API_URL_ENV};

use std::path::{Path, PathBuf};
use tracing::debug;

impl LexConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> LexResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LexError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: LexConfig = toml::from_str(&content).map_err(|e| LexError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> LexResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| LexError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| LexError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    /// The API URL environment override is applied in both cases.
    pub fn load_or_default(path: Option<&Path>) -> LexResult<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Default location of the config file (`~/.lexdesk/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".lexdesk").join("config.toml"))
    }

    /// Apply environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                debug!("API base URL overridden by {}", API_URL_ENV);
                self.api.base_url = url;
            }
        }
    }

    /// Data directory with `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.storage.data_dir)
    }

    /// Validate configuration
    pub fn validate(&self) -> LexResult<()> {
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(LexError::Config {
                message: format!("Invalid api.base_url '{}': {}", self.api.base_url, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use an absolute URL such as http://localhost:3001/api"),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(LexError::Config {
                message: "api.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set api.timeout_seconds to a positive value"),
            });
        }

        if !crate::is_valid_storage_key(&self.storage.storage_key) {
            return Err(crate::config_error!(
                format!(
                    "storage.storage_key '{}' may only use letters, digits, '-', '_' and '.', and must not start with '.'",
                    self.storage.storage_key
                ),
                "config"
            ));
        }

        for (name, path) in [
            ("navigation.default_path", &self.navigation.default_path),
            ("navigation.login_path", &self.navigation.login_path),
        ] {
            if !path.starts_with('/') {
                return Err(crate::config_error!(
                    format!("{} must start with '/'", name),
                    "config"
                ));
            }
        }

        if self.navigation.default_path == self.navigation.login_path {
            return Err(crate::config_error!(
                "navigation.default_path must differ from navigation.login_path",
                "config"
            ));
        }

        Ok(())
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
