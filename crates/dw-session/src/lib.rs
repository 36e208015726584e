//! Operator session state: who is signed in, with which role, and the
//! authenticated HTTP plumbing that hangs off it.

pub mod api_client;
pub mod error;
pub mod registration;
pub mod role;
pub mod route_guard;
pub mod session;
pub mod session_manager;
pub mod settings;
pub mod store;

#[cfg(test)]
mod tests;

pub use api_client::{API_KEY_HEADER, ApiClient, ApiError, ApiResult};
pub use error::{Result as SessionResult, SessionError};
pub use registration::Registration;
pub use role::Role;
pub use route_guard::{Route, RouteDecision, guard};
pub use session::{Credentials, Identity, Session};
pub use session_manager::SessionManager;
pub use settings::ApiSettings;
pub use store::{
    FileStore, MemoryStore, ROLE_KEY, SessionStore, StoreError, StoreResult, TOKEN_KEY,
};

/// Failure message for any non-success answer from the authenticate endpoint.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Failure message when the registration endpoint gives no `detail`.
pub const REGISTRATION_FAILED: &str = "Registration failed";
