use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use marginalia_auth::permissions::comments;
use marginalia_auth::{CommandAuthorization, Permission};
use marginalia_comments::{namespace_root, Action, CommentRegistration, CommentRegistry, RedirectBack};
use marginalia_core::NamespaceName;
use marginalia_infra::{Flash, LifecycleOutcome};

use crate::app::errors::{authz_error_to_response, not_found};
use crate::authz::authorize_action;
use crate::context::{NamespaceContext, PrincipalContext};

/// Associates an action with the permissions it requires.
pub struct ActionAuth {
    pub action: Action,
    pub required: Vec<Permission>,
}

impl ActionAuth {
    pub fn for_action(action: Action) -> Self {
        let required = match action {
            Action::Index | Action::Show => vec![comments::READ],
            Action::Create => vec![comments::CREATE],
            Action::Destroy => vec![comments::DESTROY],
        };
        Self { action, required }
    }
}

impl CommandAuthorization for ActionAuth {
    fn required_permissions(&self) -> &[Permission] {
        &self.required
    }
}

/// Resolve the route's namespace and authorize `action` in it.
///
/// Unknown namespaces are 404 before any permission check.
pub fn enter_namespace(
    registry: &CommentRegistry,
    principal: &PrincipalContext,
    raw: &str,
    action: Action,
) -> Result<NamespaceContext, Response> {
    let namespace = NamespaceName::new(raw).map_err(|_| not_found())?;
    if !registry.knows(namespace.as_str()) {
        return Err(not_found());
    }

    let ctx = NamespaceContext::new(namespace);
    authorize_action(&ctx, principal, &ActionAuth::for_action(action)).map_err(authz_error_to_response)?;
    Ok(ctx)
}

/// The namespace's comment registration; 404 when comments are disabled there.
pub fn registration<'r>(
    registry: &'r CommentRegistry,
    ctx: &NamespaceContext,
    action: Action,
) -> Result<&'r CommentRegistration, Response> {
    registry
        .registration(ctx.namespace().as_str())
        .filter(|r| r.allows(action))
        .ok_or_else(not_found)
}

/// Referer/Host pair from the request, for redirecting back.
pub fn redirect_back(headers: &HeaderMap) -> RedirectBack<'_> {
    RedirectBack::new(header_str(headers, header::REFERER), header_str(headers, header::HOST))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[derive(Debug, Serialize)]
struct RedirectBody<'a> {
    redirect_to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    flash: Option<&'a Flash>,
}

/// `303 See Other` carrying the outcome as both `Location` and JSON.
pub fn redirect_response(ctx: &NamespaceContext, outcome: &LifecycleOutcome) -> Response {
    let root = namespace_root(ctx.namespace().as_str());
    let (location, target) = match HeaderValue::from_str(&outcome.redirect_to) {
        Ok(v) => (v, outcome.redirect_to.as_str()),
        Err(_) => (HeaderValue::from_str(&root).unwrap_or(HeaderValue::from_static("/")), root.as_str()),
    };

    let body = RedirectBody {
        redirect_to: target,
        flash: outcome.flash.as_ref(),
    };

    (StatusCode::SEE_OTHER, [(header::LOCATION, location)], Json(body)).into_response()
}
