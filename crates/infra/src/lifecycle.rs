//! Create/destroy orchestration for comments.
//!
//! Both actions end in a redirect. A validation failure or a missing comment
//! is an outcome, not an error; only infrastructure failures surface as
//! [`LifecycleError`].

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use marginalia_comments::i18n::keys;
use marginalia_comments::{
    namespace_root, AuthorRef, BeforeCreate, Comment, CommentDraft, CommentError, CommentField,
    CommentRegistration, CommentRegistry, CreateCommentParams, CreateContext,
    NamespaceAuthorBinding, RedirectBack, Translator,
};
use marginalia_core::{CommentId, NamespaceName};

use crate::comment_store::{CommentStore, StoreError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Comment(#[from] CommentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One-shot message shown after the redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flash {
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleOutcome {
    pub redirect_to: String,
    pub flash: Option<Flash>,
    /// The comment created, when the action created one.
    pub created: Option<Comment>,
}

impl LifecycleOutcome {
    fn redirect(to: String) -> Self {
        Self {
            redirect_to: to,
            flash: None,
            created: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRequest<'a> {
    pub namespace: NamespaceName,
    pub operator: AuthorRef,
    pub params: CreateCommentParams,
    pub back: RedirectBack<'a>,
}

#[derive(Debug, Clone)]
pub struct DestroyRequest<'a> {
    pub namespace: NamespaceName,
    /// Raw id from the request path; an unparseable id counts as missing.
    pub comment_id: &'a str,
    pub back: RedirectBack<'a>,
}

pub struct LifecycleController<S> {
    store: S,
    hooks: Vec<Arc<dyn BeforeCreate>>,
    translator: Arc<dyn Translator>,
}

impl<S> LifecycleController<S>
where
    S: CommentStore,
{
    /// The namespace/author binding hook is always installed first.
    pub fn new(store: S, translator: Arc<dyn Translator>) -> Self {
        Self {
            store,
            hooks: vec![Arc::new(NamespaceAuthorBinding)],
            translator,
        }
    }

    /// Append a hook; it runs after every hook already installed.
    pub fn with_hook(mut self, hook: Arc<dyn BeforeCreate>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(
        &self,
        registry: &CommentRegistry,
        request: CreateRequest<'_>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let registration = registration_for(registry, &request.namespace)?;
        let back = request.back.resolve(&namespace_root(registration.namespace.as_str()));

        let ctx = CreateContext {
            namespace: request.namespace,
            operator: request.operator,
        };
        let mut draft = CommentDraft::from_params(request.params);

        for hook in &self.hooks {
            match hook.before_create(&ctx, &mut draft) {
                Ok(()) => {}
                Err(CommentError::Validation { field }) => {
                    tracing::debug!(hook = hook.name(), "before-create hook rejected comment");
                    return Ok(self.rejected(&ctx, field, back));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let new = match draft.validate() {
            Ok(new) => new,
            Err(CommentError::Validation { field }) => return Ok(self.rejected(&ctx, field, back)),
            Err(e) => return Err(e.into()),
        };

        let comment = self.store.create(new).await.map_err(store_failure)?;
        tracing::info!(
            comment_id = %comment.id_typed(),
            namespace = %comment.namespace(),
            author_type = %comment.author().author_type,
            resource_type = %comment.resource().resource_type,
            "comment created"
        );

        Ok(LifecycleOutcome {
            created: Some(comment),
            ..LifecycleOutcome::redirect(back)
        })
    }

    pub async fn destroy(
        &self,
        registry: &CommentRegistry,
        request: DestroyRequest<'_>,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        registration_for(registry, &request.namespace)?;
        let outcome =
            LifecycleOutcome::redirect(request.back.resolve(&namespace_root(request.namespace.as_str())));

        let Ok(id) = request.comment_id.parse::<CommentId>() else {
            tracing::debug!(comment_id = request.comment_id, "destroy of unparseable comment id");
            return Ok(outcome);
        };

        // Any row the index can list is destroyable, including rows reached
        // through the "all" scope.
        match self.store.destroy(id).await {
            Ok(()) => {
                tracing::info!(comment_id = %id, namespace = %request.namespace, "comment destroyed");
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(comment_id = %id, namespace = %request.namespace, "destroy of missing comment");
            }
            Err(e) => return Err(store_failure(e).into()),
        }

        Ok(outcome)
    }

    fn rejected(&self, ctx: &CreateContext, field: CommentField, back: String) -> LifecycleOutcome {
        tracing::info!(
            namespace = %ctx.namespace,
            field = %field,
            "comment rejected by validation"
        );
        LifecycleOutcome {
            flash: Some(Flash::Error(self.translator.translate(keys::ERROR_EMPTY_TEXT))),
            ..LifecycleOutcome::redirect(back)
        }
    }
}

fn registration_for<'r>(
    registry: &'r CommentRegistry,
    namespace: &NamespaceName,
) -> Result<&'r CommentRegistration, CommentError> {
    registry
        .registration(namespace.as_str())
        .ok_or_else(|| CommentError::FeatureDisabled(namespace.clone()))
}

fn store_failure(e: StoreError) -> StoreError {
    tracing::warn!(error = %e, "comment store failure");
    e
}
