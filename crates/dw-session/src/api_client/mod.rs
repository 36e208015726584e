pub(crate) mod client;
pub(crate) mod error;

pub use client::{API_KEY_HEADER, ApiClient};
pub use error::{ApiError, Result as ApiResult};
