use std::collections::HashSet;

use thiserror::Error;

use marginalia_core::NamespaceName;

use crate::{Permission, PrincipalId, NamespaceMembership, Role};

/// A fully resolved principal for authorization decisions.
///
/// Construction of this object is intentionally decoupled from storage and
/// transport: the API derives memberships from claims and [`permissions_from_roles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub principal_id: PrincipalId,
    pub active_namespace: NamespaceName,
    pub membership: NamespaceMembership,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("namespace '{0}' is outside the principal's membership")]
    NamespaceMismatch(String),

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Command-side authorization contract (checked at the action boundary).
///
/// The API layer enforces these requirements before invoking the controller.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Authorize a principal within its active namespace.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if !principal.membership.admits(&principal.active_namespace) {
        return Err(AuthzError::NamespaceMismatch(
            principal.active_namespace.to_string(),
        ));
    }

    let perms: HashSet<&str> = principal
        .membership
        .permissions
        .iter()
        .map(|p| p.as_str())
        .collect();

    if perms.contains("*") || perms.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Static role→permission policy.
///
/// - `admin` grants everything in the namespace.
/// - `operator` may read and annotate, but not remove annotations.
/// - `viewer` may only read.
pub fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    use crate::permissions::comments;

    if roles.iter().any(|r| r.as_str() == "admin") {
        return vec![Permission::new("*")];
    }

    let mut out: Vec<Permission> = Vec::new();
    for role in roles {
        let granted: &[Permission] = match role.as_str() {
            "operator" => &[comments::READ, comments::CREATE],
            "viewer" => &[comments::READ],
            _ => &[],
        };
        for p in granted {
            if !out.contains(p) {
                out.push(p.clone());
            }
        }
    }
    out
}
