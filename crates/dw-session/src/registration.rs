use crate::Role;

use std::fmt;

use serde::Serialize;

/// Organization recorded for accounts created through self-service signup.
pub const SELF_SERVICE_ORGANIZATION: &str = "Self-Registered";

/// Signup payload sent to the registration endpoint.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
    pub role: Role,
    pub keywords: Vec<String>,
    pub target_domains: Vec<String>,
    pub vip_names: Vec<String>,
}

impl Registration {
    /// Payload for a self-service account: default role, no watch lists.
    pub fn self_service(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            organization_name: String::from(SELF_SERVICE_ORGANIZATION),
            role: Role::User,
            keywords: Vec::new(),
            target_domains: Vec::new(),
            vip_names: Vec::new(),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("organization_name", &self.organization_name)
            .field("role", &self.role)
            .field("keywords", &self.keywords)
            .field("target_domains", &self.target_domains)
            .field("vip_names", &self.vip_names)
            .finish()
    }
}
