//! Role interpretation over authenticated identities.
//!
//! Checks are pure functions over the identity passed in; nothing here caches
//! a decision, so a role change on the identity is reflected by the next call.

use tracing::warn;

use store::models::{Identity, Role};

/// Case handling happens at the wire boundary; by the time an identity exists
/// its roles are canonical, so this is a plain membership test. An empty role
/// set denies and logs, since it signals a role-sync defect upstream.
pub fn has_role(identity: &Identity, role: Role) -> bool {
    if identity.roles.is_empty() {
        warn_roleless(identity);
        return false;
    }
    identity.roles.contains(&role)
}

pub fn is_admin(identity: &Identity) -> bool {
    has_role(identity, Role::Admin)
}

pub fn is_agent(identity: &Identity) -> bool {
    has_role(identity, Role::Agent)
}

pub fn is_client(identity: &Identity) -> bool {
    has_role(identity, Role::Client)
}

/// Highest-privilege role the identity carries (Admin > Agent > Client), or
/// `None` for a degraded identity with no roles.
pub fn primary_role(identity: &Identity) -> Option<Role> {
    if identity.roles.is_empty() {
        warn_roleless(identity);
        return None;
    }
    identity.roles.iter().copied().max_by_key(|role| role.rank())
}

fn warn_roleless(identity: &Identity) {
    warn!(
        user_id = identity.id,
        "authenticated identity carries no roles; denying all role checks"
    );
}
