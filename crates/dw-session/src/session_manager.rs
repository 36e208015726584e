use crate::{
    ApiSettings, Credentials, INVALID_CREDENTIALS, Identity, REGISTRATION_FAILED, ROLE_KEY,
    Registration, Role, Session, SessionError, SessionResult, SessionStore, StoreResult, TOKEN_KEY,
};

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::watch;

/// Successful answer of the authenticate endpoint. Extra fields such as
/// `token_type` are ignored.
#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    role: Role,
    #[serde(default)]
    username: Option<String>,
}

/// Single source of truth for who is signed in.
///
/// Constructed explicitly and handed to every consumer; clones share the
/// same session. Every change is published on a watch channel so consumers
/// (route guards, views) react to state instead of being told where to go.
///
/// State machine:
/// uninitialized --restore--> anonymous | authenticated
/// anonymous --login ok--> authenticated --logout--> anonymous
/// anonymous --register--> anonymous
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    settings: ApiSettings,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    state_tx: watch::Sender<Session>,
    /// Held while storage and memory are updated together, never across an await.
    commit: Mutex<()>,
}

impl SessionManager {
    /// Create a manager in the uninitialized (loading) state.
    /// Call [`SessionManager::restore`] before consumers act on it.
    pub fn new(settings: ApiSettings, store: Arc<dyn SessionStore>) -> SessionResult<Self> {
        let http = settings.http_client()?;
        let (state_tx, _) = watch::channel(Session::uninitialized());

        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                http,
                store,
                state_tx,
                commit: Mutex::new(()),
            }),
        })
    }

    /// Load the persisted token/role pair into memory.
    ///
    /// Runs once; later calls are ignored. The token is trusted as-is
    /// until some downstream request rejects it. Either key missing, or
    /// an unreadable store, yields an anonymous session.
    pub fn restore(&self) {
        if !self.inner.state_tx.borrow().is_loading() {
            debug!("Session already restored, ignoring restore()");
            return;
        }

        let restored = match self.read_stored_credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!("Failed to read stored session, starting anonymous: {e}");
                None
            }
        };

        let session = match restored {
            Some(credentials) => {
                info!("Restored session (role: {})", credentials.role());
                Session::authenticated(credentials, None)
            }
            None => {
                info!("No stored session, starting anonymous");
                Session::anonymous()
            }
        };

        self.inner.state_tx.send_replace(session);
    }

    fn read_stored_credentials(&self) -> StoreResult<Option<Credentials>> {
        let token = self.inner.store.get(TOKEN_KEY)?;
        let role = self.inner.store.get(ROLE_KEY)?;

        Ok(match (token, role) {
            (Some(token), Some(role)) => Some(Credentials::new(token, Role::from(role))),
            _ => None,
        })
    }

    /// Exchange username and password for a bearer token.
    ///
    /// On success the token and role are persisted first, then the
    /// in-memory session is replaced in one step. On any failure nothing
    /// is written.
    pub async fn login(&self, username: &str, password: &str) -> SessionResult<()> {
        let outcome = match self.try_login(username, password).await {
            Ok(session) => self.commit_login(session),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(session) => {
                info!(
                    "Signed in as {} (role: {})",
                    session.identity().map_or(username, |i| i.username.as_str()),
                    session.role().map_or("", Role::as_str)
                );
                Ok(())
            }
            Err(e) => {
                warn!("Login failed for {username}: {}", e.message());
                Err(e)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> SessionResult<Session> {
        let settings = &self.inner.settings;
        let url = settings.url(&settings.login_path);

        let response = self
            .inner
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::rejected(status.as_u16(), INVALID_CREDENTIALS));
        }

        let body: LoginResponse = response.json().await?;
        let credentials = Credentials::new(body.access_token, body.role);
        let identity = Identity {
            username: body.username.unwrap_or_else(|| username.to_string()),
            email: None,
        };

        Ok(Session::authenticated(credentials, Some(identity)))
    }

    /// Persist a freshly issued session, then publish it. Storage and memory
    /// change under the commit lock so a concurrent logout cannot interleave.
    fn commit_login(&self, session: Session) -> SessionResult<Session> {
        let _guard = self
            .inner
            .commit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(credentials) = session.credentials() {
            self.inner.store.set_all(&[
                (TOKEN_KEY, credentials.token()),
                (ROLE_KEY, credentials.role().as_str()),
            ])?;
        }

        self.inner.state_tx.send_replace(session.clone());
        Ok(session)
    }

    /// Create an account. Never signs in: the caller must call
    /// [`SessionManager::login`] afterwards.
    pub async fn register(&self, registration: &Registration) -> SessionResult<()> {
        match self.try_register(registration).await {
            Ok(()) => {
                info!("Registered account {}", registration.username);
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Registration failed for {}: {}",
                    registration.username,
                    e.message()
                );
                Err(e)
            }
        }
    }

    async fn try_register(&self, registration: &Registration) -> SessionResult<()> {
        let settings = &self.inner.settings;
        let url = settings.url(&settings.register_path);

        let response = self.inner.http.post(&url).json(registration).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        Err(SessionError::rejected(
            status.as_u16(),
            registration_failure_message(&body),
        ))
    }

    /// Forget the session in storage and in memory. Idempotent, no network.
    pub fn logout(&self) {
        let _guard = self
            .inner
            .commit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = self.inner.store.remove_all(&[TOKEN_KEY, ROLE_KEY]) {
            warn!("Failed to clear stored session: {e}");
        }

        let changed = self.inner.state_tx.send_if_modified(Session::clear);
        if changed {
            info!("Signed out");
        } else {
            debug!("logout() on an anonymous session");
        }
    }

    /// True only for the exact role name "admin".
    pub fn is_admin(&self) -> bool {
        self.inner.state_tx.borrow().is_admin()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.state_tx.borrow().clone()
    }

    /// Current bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.inner.state_tx.borrow().token().map(String::from)
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state_tx.subscribe()
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.inner.settings
    }
}

/// Operator-facing text for a failed registration: the server's `detail`
/// verbatim when it is a string, its JSON text otherwise.
pub(crate) fn registration_failure_message(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(message)) => message,
        Some(Value::Null) | None => String::from(REGISTRATION_FAILED),
        Some(other) => other.to_string(),
    }
}
