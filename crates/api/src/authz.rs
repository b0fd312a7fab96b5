//! API-side authorization guard for comment actions.
//!
//! This runs at the action boundary, before the controller is invoked, so the
//! comment crates stay auth-agnostic.

use marginalia_auth::{
    authorize, permissions_from_roles, AuthzError, CommandAuthorization, NamespaceMembership, Principal,
};

use crate::context::{NamespaceContext, PrincipalContext};

/// Check authorization for an action in the current request context.
pub fn authorize_action<A: CommandAuthorization>(
    namespace: &NamespaceContext,
    principal: &PrincipalContext,
    action: &A,
) -> Result<(), AuthzError> {
    let membership = NamespaceMembership {
        namespaces: principal.namespaces().map(<[_]>::to_vec),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    let principal = Principal {
        principal_id: principal.principal_id(),
        active_namespace: namespace.namespace().clone(),
        membership,
    };

    for perm in action.required_permissions() {
        authorize(&principal, perm)?;
    }

    Ok(())
}
