use axum::{routing::get, Router};

pub mod comments;
pub mod common;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(comments::router())
}
