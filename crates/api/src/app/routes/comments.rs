use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use marginalia_comments::{Action, CreateCommentParams, ListOrder, ResourceRef};
use marginalia_core::CommentId;
use marginalia_infra::{CreateRequest, DestroyRequest};

use crate::app::errors::{json_error, lifecycle_error_to_response, not_found, store_error_to_response};
use crate::app::routes::common::{enter_namespace, redirect_back, redirect_response, registration};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:namespace/navigation", get(navigation))
        .route("/:namespace/registrations/comments", get(registration_detail))
        .route("/:namespace/comments", get(index).post(create))
        .route("/:namespace/comments/:id", get(show).delete(destroy))
        .route(
            "/:namespace/resources/:resource_type/:resource_id/comments",
            get(resource_panel),
        )
}

/// Menu entry for the namespace; `null` when comments are disabled there.
async fn navigation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(namespace): Path<String>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Index) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };

    let menu = services.registry.menu_for(ctx.namespace().as_str());
    Json(json!({
        "namespace": ctx.namespace(),
        "menu": menu,
    }))
    .into_response()
}

async fn registration_detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(namespace): Path<String>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Index) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };

    match registration(&services.registry, &ctx, Action::Index) {
        Ok(reg) => Json(reg).into_response(),
        Err(res) => res,
    }
}

#[derive(Debug, Deserialize)]
struct IndexParams {
    scope: Option<String>,
    order: Option<String>,
}

async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(namespace): Path<String>,
    Query(params): Query<IndexParams>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Index) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };
    let reg = match registration(&services.registry, &ctx, Action::Index) {
        Ok(reg) => reg,
        Err(res) => return res,
    };

    let order = match params.order.as_deref().map(ListOrder::from_param).transpose() {
        Ok(order) => order,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_order", e.to_string()),
    };

    match services.listing.index(reg, params.scope.as_deref(), order).await {
        Ok(page) => Json(json!({
            "namespace": ctx.namespace(),
            "scope": page.scope,
            "order": page.order,
            "scopes": page.scopes,
            "index": reg.index,
            "comments": page.rows,
        }))
        .into_response(),
        Err(e) => store_error_to_response(e),
    }
}

async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((namespace, id)): Path<(String, String)>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Show) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };
    if let Err(res) = registration(&services.registry, &ctx, Action::Show) {
        return res;
    }
    let Ok(id) = id.parse::<CommentId>() else {
        return not_found();
    };

    match services.listing.show(id).await {
        Ok(Some(row)) => Json(row).into_response(),
        Ok(None) => not_found(),
        Err(e) => store_error_to_response(e),
    }
}

async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(namespace): Path<String>,
    headers: HeaderMap,
    Json(params): Json<CreateCommentParams>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Create) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };

    let request = CreateRequest {
        namespace: ctx.namespace().clone(),
        operator: principal.operator(),
        params,
        back: redirect_back(&headers),
    };

    match services.lifecycle.create(&services.registry, request).await {
        Ok(outcome) => redirect_response(&ctx, &outcome),
        Err(e) => lifecycle_error_to_response(e),
    }
}

async fn destroy(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((namespace, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Destroy) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };

    let request = DestroyRequest {
        namespace: ctx.namespace().clone(),
        comment_id: &id,
        back: redirect_back(&headers),
    };

    match services.lifecycle.destroy(&services.registry, request).await {
        Ok(outcome) => redirect_response(&ctx, &outcome),
        Err(e) => lifecycle_error_to_response(e),
    }
}

async fn resource_panel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((namespace, resource_type, resource_id)): Path<(String, String, String)>,
) -> Response {
    let ctx = match enter_namespace(&services.registry, &principal, &namespace, Action::Show) {
        Ok(ctx) => ctx,
        Err(res) => return res,
    };
    let reg = match registration(&services.registry, &ctx, Action::Show) {
        Ok(reg) => reg,
        Err(res) => return res,
    };

    let resource = ResourceRef::new(resource_type, resource_id);
    match services.listing.resource_panel(reg, &resource).await {
        Ok(rows) => Json(json!({
            "resource": resource,
            "comments": rows,
        }))
        .into_response(),
        Err(e) => store_error_to_response(e),
    }
}
