use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use marginalia_auth::AuthzError;
use marginalia_comments::CommentError;
use marginalia_infra::{LifecycleError, StoreError};

pub fn lifecycle_error_to_response(err: LifecycleError) -> axum::response::Response {
    match err {
        LifecycleError::Comment(CommentError::FeatureDisabled(_)) => not_found(),
        LifecycleError::Comment(e @ CommentError::Validation { .. }) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", e.to_string())
        }
        LifecycleError::Store(e) => store_error_to_response(e),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(_) => not_found(),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        e @ (StoreError::Unavailable(_) | StoreError::Corrupt(_)) => {
            tracing::warn!(error = %e, "comment store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    match err {
        AuthzError::NamespaceMismatch(msg) => json_error(StatusCode::FORBIDDEN, "namespace_forbidden", msg),
        AuthzError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
    }
}

pub fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
