//! Resolving a comment's author and resource into display labels.
//!
//! [`present`] applies the negotiated [`EagerLoadPolicy`]: every preloaded
//! relation is fetched with one batched loader call covering all rows; a
//! relation that is not preloaded is fetched row by row.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marginalia_comments::{AuthorRef, Comment, EagerLoadPolicy, EngineVersion, Relation, ResourceRef};
use marginalia_core::{CommentId, NamespaceName};

use crate::comment_store::StoreError;

/// Source of display labels for polymorphic references.
///
/// Refs the loader does not know are simply absent from the returned map.
#[async_trait::async_trait]
pub trait RelationLoader: Send + Sync {
    /// Version of the underlying relation engine, used once at startup to
    /// negotiate the eager-load policy.
    fn engine_version(&self) -> EngineVersion;

    async fn load_authors(&self, refs: &[AuthorRef]) -> Result<HashMap<AuthorRef, String>, StoreError>;

    async fn load_resources(
        &self,
        refs: &[ResourceRef],
    ) -> Result<HashMap<ResourceRef, String>, StoreError>;
}

/// Labels known ahead of time, usually loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DirectoryLabels {
    pub authors: Vec<AuthorLabel>,
    pub resources: Vec<ResourceLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorLabel {
    #[serde(flatten)]
    pub author: AuthorRef,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceLabel {
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub label: String,
}

/// In-memory label directory.
#[derive(Debug)]
pub struct InMemoryDirectory {
    version: EngineVersion,
    authors: RwLock<HashMap<AuthorRef, String>>,
    resources: RwLock<HashMap<ResourceRef, String>>,
}

impl InMemoryDirectory {
    pub fn new(version: EngineVersion) -> Self {
        Self {
            version,
            authors: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// A directory pre-populated with `labels`.
    pub fn seeded(version: EngineVersion, labels: &DirectoryLabels) -> Result<Self, StoreError> {
        let directory = Self::new(version);
        for entry in &labels.authors {
            directory.register_author(entry.author.clone(), entry.label.clone())?;
        }
        for entry in &labels.resources {
            directory.register_resource(entry.resource.clone(), entry.label.clone())?;
        }
        Ok(directory)
    }

    pub fn register_author(&self, author: AuthorRef, label: impl Into<String>) -> Result<(), StoreError> {
        register(&self.authors, author, label.into())
    }

    pub fn register_resource(
        &self,
        resource: ResourceRef,
        label: impl Into<String>,
    ) -> Result<(), StoreError> {
        register(&self.resources, resource, label.into())
    }
}

fn register<K>(map: &RwLock<HashMap<K, String>>, key: K, label: String) -> Result<(), StoreError>
where
    K: Eq + Hash,
{
    map.write()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?
        .insert(key, label);
    Ok(())
}

fn lookup<K>(map: &RwLock<HashMap<K, String>>, refs: &[K]) -> Result<HashMap<K, String>, StoreError>
where
    K: Clone + Eq + Hash,
{
    let map = map
        .read()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
    Ok(refs
        .iter()
        .filter_map(|r| map.get(r).map(|label| (r.clone(), label.clone())))
        .collect())
}

#[async_trait::async_trait]
impl RelationLoader for InMemoryDirectory {
    fn engine_version(&self) -> EngineVersion {
        self.version
    }

    async fn load_authors(&self, refs: &[AuthorRef]) -> Result<HashMap<AuthorRef, String>, StoreError> {
        lookup(&self.authors, refs)
    }

    async fn load_resources(
        &self,
        refs: &[ResourceRef],
    ) -> Result<HashMap<ResourceRef, String>, StoreError> {
        lookup(&self.resources, refs)
    }
}

/// A comment ready for display, with resolved labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRow {
    pub id: CommentId,
    pub namespace: NamespaceName,
    pub resource_type: String,
    pub resource_id: String,
    pub resource: String,
    pub author_type: String,
    pub author_id: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn distinct<T: Clone + Eq + Hash>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|i| seen.insert(i.clone())).collect()
}

/// Resolve labels for `comments`, preserving their order.
pub async fn present(
    loader: &dyn RelationLoader,
    policy: EagerLoadPolicy,
    comments: Vec<Comment>,
) -> Result<Vec<CommentRow>, StoreError> {
    if comments.is_empty() {
        return Ok(Vec::new());
    }

    let authors = if policy.preloads(Relation::Author) {
        loader
            .load_authors(&distinct(comments.iter().map(|c| c.author().clone())))
            .await?
    } else {
        HashMap::new()
    };
    let resources = if policy.preloads(Relation::Resource) {
        loader
            .load_resources(&distinct(comments.iter().map(|c| c.resource().clone())))
            .await?
    } else {
        HashMap::new()
    };

    let mut rows = Vec::with_capacity(comments.len());
    for comment in comments {
        let author = match authors.get(comment.author()) {
            Some(label) => label.clone(),
            None if policy.preloads(Relation::Author) => comment.author().fallback_label(),
            None => {
                let loaded = loader.load_authors(std::slice::from_ref(comment.author())).await?;
                loaded
                    .get(comment.author())
                    .cloned()
                    .unwrap_or_else(|| comment.author().fallback_label())
            }
        };
        let resource = match resources.get(comment.resource()) {
            Some(label) => label.clone(),
            None if policy.preloads(Relation::Resource) => comment.resource().fallback_label(),
            None => {
                let loaded = loader
                    .load_resources(std::slice::from_ref(comment.resource()))
                    .await?;
                loaded
                    .get(comment.resource())
                    .cloned()
                    .unwrap_or_else(|| comment.resource().fallback_label())
            }
        };

        rows.push(CommentRow {
            id: comment.id_typed(),
            namespace: comment.namespace().clone(),
            resource_type: comment.resource().resource_type.clone(),
            resource_id: comment.resource().resource_id.clone(),
            resource,
            author_type: comment.author().author_type.clone(),
            author_id: comment.author().author_id.clone(),
            author,
            body: comment.body().to_string(),
            created_at: comment.created_at(),
            updated_at: comment.updated_at(),
        });
    }

    Ok(rows)
}
