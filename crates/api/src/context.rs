use marginalia_auth::{JwtClaims, PrincipalId, Role};
use marginalia_comments::AuthorRef;
use marginalia_core::NamespaceName;

/// Namespace context for a request, taken from the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceContext {
    namespace: NamespaceName,
}

impl NamespaceContext {
    pub fn new(namespace: NamespaceName) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }
}

/// Principal context for a request (authenticated operator + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    principal_type: String,
    namespaces: Option<Vec<NamespaceName>>,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn from_claims(claims: JwtClaims) -> Self {
        Self {
            principal_id: claims.sub,
            principal_type: claims.principal_type,
            namespaces: claims.namespaces,
            roles: claims.roles,
        }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn principal_type(&self) -> &str {
        &self.principal_type
    }

    /// `None` means every namespace.
    pub fn namespaces(&self) -> Option<&[NamespaceName]> {
        self.namespaces.as_deref()
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// The operator as recorded on comments they author.
    pub fn operator(&self) -> AuthorRef {
        AuthorRef::new(self.principal_type.clone(), self.principal_id.to_string())
    }
}
