use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:8000/ws";

// Reconnect delay constraints (seconds)
pub const MIN_RECONNECT_DELAY_SECS: u64 = 1;
pub const MAX_RECONNECT_DELAY_SECS: u64 = 300;
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 3;

// Event window constraints
pub const MIN_WINDOW_SIZE: usize = 1;
pub const MAX_WINDOW_SIZE: usize = 10000;
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Live feed connection settings.
///
/// The reconnect delay is fixed: every disconnect waits exactly this long
/// before the next attempt.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// WebSocket endpoint (ws:// or wss://)
    pub url: String,
    /// Delay before reconnecting after any disconnect
    pub reconnect_delay_secs: u64,
    /// Number of most recent events kept in memory
    pub window_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_FEED_URL),
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::feed(format!(
                "feed.url must start with ws:// or wss://, got '{}'",
                self.url
            )));
        }

        if self.reconnect_delay_secs < MIN_RECONNECT_DELAY_SECS
            || self.reconnect_delay_secs > MAX_RECONNECT_DELAY_SECS
        {
            return Err(ConfigError::feed(format!(
                "feed.reconnect_delay_secs must be {}-{}, got {}",
                MIN_RECONNECT_DELAY_SECS, MAX_RECONNECT_DELAY_SECS, self.reconnect_delay_secs
            )));
        }

        if self.window_size < MIN_WINDOW_SIZE || self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::feed(format!(
                "feed.window_size must be {}-{}, got {}",
                MIN_WINDOW_SIZE, MAX_WINDOW_SIZE, self.window_size
            )));
        }

        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}
