//! # Client Configuration
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. TOML file (`--config` or `CPS_CONFIG`)
//! 3. Environment (`CPS_API_URL`, `CPS_TIMEOUT_SECS`, `CPS_PAGE_SIZE`)
//! 4. Command-line flags
//!
//! ```toml
//! api_url = "http://localhost:8000"
//! timeout_secs = 0   # 0 keeps the transport default
//! page_size = 100
//! ```

use cps_core::CpsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CPS_CONFIG";

/// Maximum accepted config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds; 0 keeps the transport default.
    #[serde(default)]
    pub timeout_secs: u64,
    /// Default `limit` for session listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: 0,
            page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, CpsError> {
        toml::from_str(text).map_err(|e| CpsError::InvalidConfig(e.to_string()))
    }

    /// Load a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CpsError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CpsError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CpsError::InvalidConfig(format!(
                "Config file {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            CpsError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then `path` (or the file named by `CPS_CONFIG`), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, CpsError> {
        let env_path = std::env::var(CONFIG_ENV).ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let mut config = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading config file");
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), CpsError> {
        if let Some(url) = lookup("CPS_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(raw) = lookup("CPS_TIMEOUT_SECS") {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                CpsError::InvalidConfig(format!("CPS_TIMEOUT_SECS is not a number: {raw}"))
            })?;
        }
        if let Some(raw) = lookup("CPS_PAGE_SIZE") {
            self.page_size = raw.trim().parse().map_err(|_| {
                CpsError::InvalidConfig(format!("CPS_PAGE_SIZE is not a number: {raw}"))
            })?;
        }
        Ok(())
    }

    /// Check the backend URL scheme and normalise a trailing slash away.
    pub fn validate(&mut self) -> Result<(), CpsError> {
        let url = self.api_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CpsError::InvalidConfig(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.page_size == 0 {
            return Err(CpsError::InvalidConfig("page_size must be positive".to_string()));
        }
        self.api_url = url;
        Ok(())
    }
}
