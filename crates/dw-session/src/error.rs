use crate::StoreError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Why a session operation failed.
///
/// Session operations report failure through this value; nothing escapes
/// the session manager as a panic. [`SessionError::message`] is the text
/// meant for the operator.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Request rejected (HTTP {status}): {message} {location}")]
    Rejected {
        status: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport error: {message} {location}")]
    Transport {
        message: String,
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },

    #[error("Unexpected response: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Session storage error: {source} {location}")]
    Storage {
        #[source]
        source: StoreError,
        location: ErrorLocation,
    },
}

impl SessionError {
    /// Human-readable failure text, without source locations.
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. }
            | Self::Transport { message, .. }
            | Self::Decode { message, .. } => message.clone(),
            Self::Storage { source, .. } => source.recovery_hint().to_string(),
        }
    }

    #[track_caller]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn storage(source: StoreError) -> Self {
        Self::Storage {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Convert reqwest error with context. Body decode failures are
    /// reported as `Decode`, everything else as `Transport`.
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::decode(err.to_string());
        }
        Self::Transport {
            message: err.to_string(),
            source: err,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<reqwest::Error> for SessionError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        SessionError::from_reqwest(err)
    }
}

impl From<StoreError> for SessionError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        SessionError::storage(err)
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
