use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marginalia_core::NamespaceName;

/// Identity of an authenticated operator (human admin, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for Uuid {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// The namespaces an operator may act in, with the roles/permissions granted there.
///
/// `namespaces == None` means the operator is not restricted to a subset of
/// namespaces (the common case for dashboard administrators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMembership {
    pub namespaces: Option<Vec<NamespaceName>>,
    pub roles: Vec<crate::Role>,
    pub permissions: Vec<crate::Permission>,
}

impl NamespaceMembership {
    pub fn admits(&self, namespace: &NamespaceName) -> bool {
        match &self.namespaces {
            None => true,
            Some(allowed) => allowed.iter().any(|n| n == namespace),
        }
    }
}
