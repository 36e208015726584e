use std::time::Duration;

/// Fixed wait between a disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Number of events retained in the window.
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Where the feed lives and how the client behaves around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSettings {
    /// WebSocket endpoint (e.g., "ws://127.0.0.1:8000/ws")
    pub url: String,
    /// Constant delay before each reconnect, no backoff
    pub reconnect_delay: Duration,
    pub window_size: usize,
}

impl FeedSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}
