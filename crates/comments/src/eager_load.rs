//! Which relations to preload when listing comments.
//!
//! Rendering a comment row shows its author and its resource; loading those
//! one row at a time is an N+1 query storm. The policy is negotiated once from
//! the relation engine's version and then only read.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Author,
    Resource,
}

/// `major.minor.patch` version reported by a relation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }
}

impl core::fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid engine version '{0}'")]
pub struct VersionParseError(String);

impl FromStr for EngineVersion {
    type Err = VersionParseError;

    /// Accepts `4`, `4.1`, `4.1.1` and ignores a pre-release/build suffix
    /// (`4.1.0-rc1`, `4.1.0+meta`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .split(|c: char| c == '-' || c == '+')
            .next()
            .unwrap_or_default();
        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u32, VersionParseError> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| VersionParseError(s.to_string())),
                None if required => Err(VersionParseError(s.to_string())),
                None => Ok(0),
            }
        };
        let version = EngineVersion::new(next(true)?, next(false)?, next(false)?);
        if parts.next().is_some() {
            return Err(VersionParseError(s.to_string()));
        }
        Ok(version)
    }
}

/// Inclusive version range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub lowest: EngineVersion,
    pub highest: EngineVersion,
}

impl VersionRange {
    pub fn contains(&self, v: EngineVersion) -> bool {
        self.lowest <= v && v <= self.highest
    }
}

/// Engine releases that cannot preload two distinct polymorphic relations in
/// one batch.
pub const MULTI_RELATION_PRELOAD_BROKEN: VersionRange = VersionRange {
    lowest: EngineVersion::new(4, 1, 0),
    highest: EngineVersion::new(4, 1, 1),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EagerLoadPolicy {
    AuthorAndResource,
    AuthorOnly,
}

impl EagerLoadPolicy {
    /// The single decision point. Call once at startup.
    pub fn negotiate(engine: EngineVersion) -> Self {
        if MULTI_RELATION_PRELOAD_BROKEN.contains(engine) {
            EagerLoadPolicy::AuthorOnly
        } else {
            EagerLoadPolicy::AuthorAndResource
        }
    }

    pub fn relations(self) -> &'static [Relation] {
        match self {
            EagerLoadPolicy::AuthorAndResource => &[Relation::Author, Relation::Resource],
            EagerLoadPolicy::AuthorOnly => &[Relation::Author],
        }
    }

    pub fn preloads(self, relation: Relation) -> bool {
        self.relations().contains(&relation)
    }
}
