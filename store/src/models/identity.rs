use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use common::config;

/// Role carried by an authenticated identity.
///
/// Wire payloads carry role tags as configured literals (`ROLE_ADMIN` etc.);
/// everything past the boundary works with this enum only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    Agent,
    Client,
}

impl Role {
    /// Maps a wire tag onto a role, comparing case-insensitively against the
    /// configured literals first and the canonical names as a fallback.
    pub fn from_tag(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(&config::role_admin()) {
            Some(Role::Admin)
        } else if raw.eq_ignore_ascii_case(&config::role_agent()) {
            Some(Role::Agent)
        } else if raw.eq_ignore_ascii_case(&config::role_client()) {
            Some(Role::Client)
        } else {
            raw.parse().ok()
        }
    }

    /// The configured wire literal for this role.
    pub fn tag(&self) -> String {
        match self {
            Role::Admin => config::role_admin(),
            Role::Agent => config::role_agent(),
            Role::Client => config::role_client(),
        }
    }

    /// Privilege order used to pick a primary role: Admin > Agent > Client.
    pub const fn rank(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Agent => 2,
            Role::Client => 1,
        }
    }
}

/// An authenticated user as the policy layer sees it.
///
/// An empty `roles` set is a degraded identity: the backend authenticated the
/// user but sent no role claims. Policy code treats it as least-privileged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A user as referenced from a ticket (creator, assignee).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Identity> for UserRef {
    fn from(identity: &Identity) -> Self {
        UserRef {
            id: identity.id,
            name: identity.name.clone(),
            email: identity.email.clone(),
        }
    }
}
