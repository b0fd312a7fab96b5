//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, relation loader, lifecycle controller and listing
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use marginalia_comments::{global, CommentRegistry};
use marginalia_infra::{AppConfig, StoreError};
use thiserror::Error;

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("comment registry has not been installed")]
    RegistryNotInstalled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Build the router around the process-wide registry installed at startup.
pub async fn build_installed_app(config: &AppConfig) -> Result<Router, BuildError> {
    let registry = global().ok_or(BuildError::RegistryNotInstalled)?;
    Ok(build_app(config, registry).await?)
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// The registry is passed explicitly so tests can build apps with different
/// namespace setups in one process.
pub async fn build_app(config: &AppConfig, registry: Arc<CommentRegistry>) -> Result<Router, StoreError> {
    let jwt = Arc::new(marginalia_auth::Hs256JwtValidator::new(
        config.jwt_secret.clone().into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(config, registry).await?);

    // Protected routes: require an authenticated operator.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_log))))
}
