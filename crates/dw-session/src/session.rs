use crate::Role;

use std::fmt;

/// Bearer token and the role it was issued for.
///
/// The two only ever exist together, so a session can never hold a token
/// with a stale role from an earlier sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    role: Role,
}

impl Credentials {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Display identity of the operator. Only known right after a sign-in;
/// it is not persisted, so a restored session has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub email: Option<String>,
}

/// In-memory session of the current operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credentials: Option<Credentials>,
    identity: Option<Identity>,
    loading: bool,
}

impl Session {
    /// State before the stored session has been read.
    pub fn uninitialized() -> Self {
        Self {
            credentials: None,
            identity: None,
            loading: true,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            credentials: None,
            identity: None,
            loading: false,
        }
    }

    pub fn authenticated(credentials: Credentials, identity: Option<Identity>) -> Self {
        Self {
            credentials: Some(credentials),
            identity,
            loading: false,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::token)
    }

    pub fn role(&self) -> Option<&Role> {
        self.credentials.as_ref().map(Credentials::role)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Authentication is carried by the token alone; identity is display only.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(Role::is_admin)
    }

    /// Drops credentials and identity. Returns whether anything changed.
    pub(crate) fn clear(&mut self) -> bool {
        if self.credentials.is_none() && self.identity.is_none() {
            return false;
        }
        self.credentials = None;
        self.identity = None;
        true
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::uninitialized()
    }
}
