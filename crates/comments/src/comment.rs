//! The comment entity, its polymorphic references, and creation-time validation.
//!
//! A comment can only reach a store as a [`NewComment`], and the only way to
//! obtain one is [`CommentDraft::validate`]. Drafts are built from the permitted
//! request fields and then stamped by the before-create hooks (see
//! [`crate::hook`]) before validation runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marginalia_core::{CommentId, Entity, NamespaceName, ValueObject};

use crate::error::{CommentError, CommentField};

/// Polymorphic reference to the annotated domain object.
///
/// The comment only points at the resource; the resource's lifecycle is owned
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: String,
    pub resource_id: String,
}

impl ResourceRef {
    pub fn new(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Label used when the resource cannot be resolved (`"Order #17"`).
    pub fn fallback_label(&self) -> String {
        format!("{} #{}", self.resource_type, self.resource_id)
    }
}

impl ValueObject for ResourceRef {}

/// Polymorphic reference to the operator who wrote a comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef {
    pub author_type: String,
    pub author_id: String,
}

impl AuthorRef {
    pub fn new(author_type: impl Into<String>, author_id: impl Into<String>) -> Self {
        Self {
            author_type: author_type.into(),
            author_id: author_id.into(),
        }
    }

    pub fn fallback_label(&self) -> String {
        format!("{} #{}", self.author_type, self.author_id)
    }
}

impl ValueObject for AuthorRef {}

/// A persisted comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    resource: ResourceRef,
    namespace: NamespaceName,
    author: AuthorRef,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    /// Materialize a validated comment as a stored record.
    pub fn persisted(new: NewComment, id: CommentId, at: DateTime<Utc>) -> Self {
        Self {
            id,
            resource: new.resource,
            namespace: new.namespace,
            author: new.author,
            body: new.body,
            created_at: at,
            updated_at: at,
        }
    }

    /// Rebuild a comment from storage columns.
    ///
    /// Only store adapters should call this; it performs no validation because
    /// the row was validated on the way in.
    pub fn restore(
        id: CommentId,
        resource: ResourceRef,
        namespace: NamespaceName,
        author: AuthorRef,
        body: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            resource,
            namespace,
            author,
            body,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> CommentId {
        self.id
    }

    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }

    pub fn author(&self) -> &AuthorRef {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Comment {
    type Id = CommentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn type_name() -> &'static str {
        "Comment"
    }
}

/// Fields an operator may submit when creating a comment.
///
/// Deserializing into this type *is* the mass-assignment allowlist: anything
/// else in the payload (`author_id`, `author_type`, `id`, timestamps...) is
/// dropped. `namespace` is accepted but always overwritten by the binding hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommentParams {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Names of the permitted create fields, in declaration order.
pub const PERMITTED_PARAMS: [&str; 4] = ["body", "namespace", "resource_id", "resource_type"];

/// A comment under construction, before hooks and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub resource_type: String,
    pub resource_id: String,
    pub body: String,
    pub namespace: Option<NamespaceName>,
    pub author: Option<AuthorRef>,
}

impl CommentDraft {
    pub fn from_params(params: CreateCommentParams) -> Self {
        Self {
            resource_type: params.resource_type.unwrap_or_default(),
            resource_id: params.resource_id.unwrap_or_default(),
            body: params.body.unwrap_or_default(),
            // A malformed client value is as good as none: the binding hook
            // replaces it either way.
            namespace: params.namespace.and_then(|n| NamespaceName::new(n).ok()),
            author: None,
        }
    }

    /// Check the creation invariants and seal the draft.
    ///
    /// Field order matters only for which error is reported first: body, then
    /// resource, then namespace/author.
    pub fn validate(self) -> Result<NewComment, CommentError> {
        if self.body.trim().is_empty() {
            return Err(CommentError::validation(CommentField::Body));
        }

        let resource_type = self.resource_type.trim();
        let resource_id = self.resource_id.trim();
        if resource_type.is_empty() || resource_id.is_empty() {
            return Err(CommentError::validation(CommentField::Resource));
        }
        if resource_type == Comment::type_name() {
            return Err(CommentError::validation(CommentField::ResourceType));
        }

        let namespace = self
            .namespace
            .ok_or(CommentError::validation(CommentField::Namespace))?;
        let author = self
            .author
            .ok_or(CommentError::validation(CommentField::Author))?;

        Ok(NewComment {
            resource: ResourceRef::new(resource_type, resource_id),
            namespace,
            author,
            body: self.body,
        })
    }
}

/// A validated comment that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    resource: ResourceRef,
    namespace: NamespaceName,
    author: AuthorRef,
    body: String,
}

impl NewComment {
    pub fn resource(&self) -> &ResourceRef {
        &self.resource
    }

    pub fn namespace(&self) -> &NamespaceName {
        &self.namespace
    }

    pub fn author(&self) -> &AuthorRef {
        &self.author
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
