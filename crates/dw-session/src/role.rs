use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse privilege level of the signed-in operator.
///
/// Role names are matched exactly (case-sensitive). Anything the server
/// sends that is not one of the known names is kept verbatim in `Other`
/// so it survives a round trip through the session store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Analyst,
    Admin,
    Other(String),
}

impl Role {
    pub fn parse(name: &str) -> Self {
        match name {
            "user" => Role::User,
            "analyst" => Role::Analyst,
            "admin" => Role::Admin,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Analyst => "analyst",
            Role::Admin => "admin",
            Role::Other(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Role::parse(&name)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Role::parse(name)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
