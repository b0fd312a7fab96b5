use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marginalia_core::NamespaceName;

use crate::{PrincipalId, Role};

/// Polymorphic type recorded as a comment's `author_type` when the token does
/// not name one.
pub const DEFAULT_PRINCIPAL_TYPE: &str = "AdminUser";

fn default_principal_type() -> String {
    DEFAULT_PRINCIPAL_TYPE.to_string()
}

/// JWT claims model (transport-agnostic).
///
/// This is the minimal set of claims Marginalia expects once a token has been
/// decoded/verified by [`crate::JwtValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Polymorphic type of the subject (e.g. `"AdminUser"`).
    #[serde(default = "default_principal_type")]
    pub principal_type: String,

    /// Namespaces the subject may act in; absent means all of them.
    #[serde(default)]
    pub namespaces: Option<Vec<NamespaceName>>,

    /// RBAC roles granted to the subject.
    pub roles: Vec<Role>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
