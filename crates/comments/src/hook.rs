//! Before-create callbacks.
//!
//! Hooks run in registration order on every create attempt, before the draft
//! is validated. [`NamespaceAuthorBinding`] is the authenticity guarantee for a
//! comment's namespace and author; the lifecycle controller always installs it
//! first.

use marginalia_core::NamespaceName;

use crate::comment::{AuthorRef, CommentDraft};
use crate::error::CommentError;

/// Request-derived facts a hook may stamp onto a draft.
///
/// Built by the controller from the route's namespace and the authenticated
/// operator, never from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContext {
    pub namespace: NamespaceName,
    pub operator: AuthorRef,
}

pub trait BeforeCreate: Send + Sync {
    /// Hook name, for logs.
    fn name(&self) -> &str;

    fn before_create(&self, ctx: &CreateContext, draft: &mut CommentDraft) -> Result<(), CommentError>;
}

/// Overwrites the draft's namespace and author with the active namespace and
/// the current operator, discarding whatever the client submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceAuthorBinding;

impl BeforeCreate for NamespaceAuthorBinding {
    fn name(&self) -> &str {
        "namespace_author_binding"
    }

    fn before_create(&self, ctx: &CreateContext, draft: &mut CommentDraft) -> Result<(), CommentError> {
        if let Some(submitted) = &draft.namespace {
            if submitted != &ctx.namespace {
                tracing::debug!(
                    submitted = %submitted,
                    active = %ctx.namespace,
                    "discarding client-supplied comment namespace"
                );
            }
        }
        draft.namespace = Some(ctx.namespace.clone());
        draft.author = Some(ctx.operator.clone());
        Ok(())
    }
}
