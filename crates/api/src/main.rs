use anyhow::Context;

use marginalia_comments::{install_global, CommentRegistry, EnglishCatalog};
use marginalia_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    marginalia_observability::init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let registry = CommentRegistry::build(&config.comments, &config.namespaces, &EnglishCatalog::new())
        .context("invalid comment configuration")?;
    install_global(registry)?;

    let app = marginalia_api::app::build_installed_app(&config)
        .await
        .context("failed to wire services")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
