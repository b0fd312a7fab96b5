//! `marginalia-auth`: operator identity and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It supplies the
//! "current operator" the comment subsystem stamps onto new comments.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, permissions_from_roles, AuthzError, CommandAuthorization, Principal};
pub use claims::{JwtClaims, TokenValidationError, validate_claims, DEFAULT_PRINCIPAL_TYPE};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Permission;
pub use principal::{NamespaceMembership, PrincipalId};
pub use roles::Role;
