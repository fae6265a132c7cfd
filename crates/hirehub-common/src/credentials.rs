//! Read-only access to the persisted client session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the backend user id.
pub const USER_ID_KEY: &str = "userId";
/// Storage key holding the account role.
pub const ROLE_KEY: &str = "role";

/// Persistent client storage, keyed by string.
pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Source of the current bearer token.
///
/// Implementations must read the backing store on every call; callers rely
/// on a removed token being observed at the next read.
pub trait CredentialProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Account role issued by the backend at login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Worker,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Worker => "WORKER",
            Role::Admin => "ADMIN",
        }
    }

    /// Landing page for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Owner => "/owner-dashboard",
            Role::Worker => "/worker-dashboard",
            Role::Admin => "/admin/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Case-insensitive, matching how stored roles are compared.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Ok(Role::Owner),
            "WORKER" => Ok(Role::Worker),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
