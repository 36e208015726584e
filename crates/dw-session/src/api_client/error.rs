use std::panic::Location;

use error_location::ErrorLocation;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during API calls
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {message} {location}")]
    Http {
        message: String,
        location: ErrorLocation,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error: HTTP {status}: {detail} {location}")]
    Status {
        status: u16,
        detail: String,
        body: Value,
        location: ErrorLocation,
    },

    #[error("JSON parse error: {message} {location}")]
    Json {
        message: String,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Convert reqwest error with context
    #[track_caller]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        ApiError::Http {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    /// Convert JSON error with context
    #[track_caller]
    pub fn from_json(err: serde_json::Error) -> Self {
        ApiError::Json {
            message: err.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    /// Non-success status. `detail` is taken from the body when the
    /// backend provides one.
    #[track_caller]
    pub fn status(status: u16, body: Value) -> Self {
        let detail = match body.get("detail").or_else(|| body.get("message")) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => match &body {
                Value::String(s) => s.clone(),
                Value::Null => String::from("no response body"),
                other => other.to_string(),
            },
        };

        ApiError::Status {
            status,
            detail,
            body,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Json { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        ApiError::from_reqwest(err)
    }
}

impl From<serde_json::Error> for ApiError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        ApiError::from_json(err)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
