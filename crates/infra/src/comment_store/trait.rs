use std::sync::Arc;

use thiserror::Error;

use marginalia_comments::{Comment, ListOrder, NewComment, ResourceRef, ScopeFilter};
use marginalia_core::CommentId;

/// Comment store operation error.
///
/// These are infrastructure failures. Validation never reaches a store: stores
/// only accept [`NewComment`], which exists only after validation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("comment {0} not found")]
    NotFound(CommentId),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored comment is corrupt: {0}")]
    Corrupt(String),

    #[error("conflicting write: {0}")]
    Conflict(String),
}

/// Listing criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub namespace: ScopeFilter,
    pub resource: Option<ResourceRef>,
    pub order: ListOrder,
}

impl CommentQuery {
    pub fn new(namespace: ScopeFilter) -> Self {
        Self {
            namespace,
            resource: None,
            order: ListOrder::default(),
        }
    }

    pub fn for_resource(resource: ResourceRef, namespace: ScopeFilter) -> Self {
        Self {
            resource: Some(resource),
            ..Self::new(namespace)
        }
    }

    pub fn ordered(mut self, order: ListOrder) -> Self {
        self.order = order;
        self
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        self.namespace.matches(comment.namespace())
            && self
                .resource
                .as_ref()
                .is_none_or(|r| r == comment.resource())
    }
}

/// Owner of all comment records.
///
/// The store does not check namespace correctness; callers pass a filter.
#[async_trait::async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a validated comment, assigning its id and timestamps.
    async fn create(&self, comment: NewComment) -> Result<Comment, StoreError>;

    async fn get(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;

    /// Remove a comment. Missing ids yield [`StoreError::NotFound`].
    async fn destroy(&self, id: CommentId) -> Result<(), StoreError>;

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError>;

    async fn count(&self, namespace: &ScopeFilter) -> Result<u64, StoreError>;

    /// Comments attached to one resource.
    async fn list_for(
        &self,
        resource: &ResourceRef,
        namespace: &ScopeFilter,
        order: ListOrder,
    ) -> Result<Vec<Comment>, StoreError> {
        let query = CommentQuery::for_resource(resource.clone(), namespace.clone()).ordered(order);
        self.list(&query).await
    }
}

#[async_trait::async_trait]
impl<S> CommentStore for Arc<S>
where
    S: CommentStore + ?Sized,
{
    async fn create(&self, comment: NewComment) -> Result<Comment, StoreError> {
        (**self).create(comment).await
    }

    async fn get(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        (**self).get(id).await
    }

    async fn destroy(&self, id: CommentId) -> Result<(), StoreError> {
        (**self).destroy(id).await
    }

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError> {
        (**self).list(query).await
    }

    async fn count(&self, namespace: &ScopeFilter) -> Result<u64, StoreError> {
        (**self).count(namespace).await
    }

    async fn list_for(
        &self,
        resource: &ResourceRef,
        namespace: &ScopeFilter,
        order: ListOrder,
    ) -> Result<Vec<Comment>, StoreError> {
        (**self).list_for(resource, namespace, order).await
    }
}
