use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";
pub const DEFAULT_REGISTER_PATH: &str = "/auth/register";

// Request timeout constraints (seconds)
pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Remote API settings used by the session manager and the API client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "http://127.0.0.1:8000")
    pub base_url: String,
    /// Path of the form-encoded authenticate endpoint
    pub login_path: String,
    /// Path of the JSON registration endpoint
    pub register_path: String,
    /// Sent as X-API-KEY on every request when set
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            login_path: String::from(DEFAULT_LOGIN_PATH),
            register_path: String::from(DEFAULT_REGISTER_PATH),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::api(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        for (name, path) in [
            ("login_path", &self.login_path),
            ("register_path", &self.register_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::api(format!(
                    "api.{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }

        if self.timeout_secs < MIN_TIMEOUT_SECS || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::api(format!(
                "api.timeout_secs must be {}-{}, got {}",
                MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS, self.timeout_secs
            )));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
