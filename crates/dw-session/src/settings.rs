use std::fmt;
use std::time::Duration;

/// Default per-request budget for calls to the backend.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the backend lives and how to reach it.
#[derive(Clone)]
pub struct ApiSettings {
    /// Server URL (e.g., "http://127.0.0.1:8000"), trailing slash trimmed
    pub base_url: String,
    pub login_path: String,
    pub register_path: String,
    /// Sent as X-API-KEY when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl ApiSettings {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            login_path: String::from("/auth/login"),
            register_path: String::from("/auth/register"),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .field("register_path", &self.register_path)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
