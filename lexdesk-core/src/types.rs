//! Core configuration types

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Default API base URL when neither the config file nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Environment variable overriding `api.base_url`
pub const API_URL_ENV: &str = "LEXDESK_API_URL";

/// Fixed namespace of the persisted session entry
pub const DEFAULT_STORAGE_KEY: &str = "auth-storage";

/// Storage keys double as file names: ASCII alphanumerics, `-`, `_` and `.`, not leading `.`
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Top-level client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub navigation: NavigationConfig,
    pub logging: LoggingConfig,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
            user_agent: format!("lexdesk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Durable session storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding persisted entries; `~` expands to the home directory
    pub data_dir: String,
    /// Key the session triple is stored under
    pub storage_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.lexdesk/data".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// How menu items without an explicit admin rule are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationPolicy {
    /// Every non-admin item is visible
    #[default]
    AllowByDefault,
    /// Module-tagged items need the module in the user's enabled modules
    DenyByDefault,
}

impl std::fmt::Display for NavigationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationPolicy::AllowByDefault => write!(f, "allow-by-default"),
            NavigationPolicy::DenyByDefault => write!(f, "deny-by-default"),
        }
    }
}

impl std::str::FromStr for NavigationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" | "allow-by-default" => Ok(NavigationPolicy::AllowByDefault),
            "deny" | "deny-by-default" => Ok(NavigationPolicy::DenyByDefault),
            _ => Err(format!("Unknown navigation policy: {}", s)),
        }
    }
}

/// Routing and menu settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Role that bypasses every permission check
    pub owner_role: String,
    /// Where authenticated users land
    pub default_path: String,
    /// Path of the login view
    pub login_path: String,
    pub policy: NavigationPolicy,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            owner_role: "MANAGING_PARTNER_CEO".to_string(),
            default_path: "/dashboard".to_string(),
            login_path: "/login".to_string(),
            policy: NavigationPolicy::AllowByDefault,
        }
    }
}
