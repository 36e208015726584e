use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures inside the feed loop. They drive reconnects and diagnostics
/// and never reach consumers of [`crate::LiveFeedClient`].
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to connect to {url}: {message} {location}")]
    Connect {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed event: {message} {location}")]
    Parse {
        message: String,
        location: ErrorLocation,
    },
}

impl FeedError {
    #[track_caller]
    pub fn connect(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            url: url.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short label used as a metrics suffix.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Transport { .. } => "transport",
            Self::Parse { .. } => "parse",
        }
    }
}

impl From<serde_json::Error> for FeedError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        FeedError::parse(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    #[track_caller]
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FeedError::transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
