use std::sync::Arc;

use marginalia_comments::{CommentRegistry, EnglishCatalog, Translator};
use marginalia_infra::{
    AppConfig, CommentListing, CommentStore, InMemoryCommentStore, InMemoryDirectory,
    LifecycleController, RelationLoader, StoreError,
};

#[cfg(feature = "postgres")]
use marginalia_infra::PostgresCommentStore;

pub type SharedStore = Arc<dyn CommentStore>;

pub struct AppServices {
    pub registry: Arc<CommentRegistry>,
    pub lifecycle: LifecycleController<SharedStore>,
    pub listing: CommentListing<SharedStore>,
}

pub async fn build_services(
    config: &AppConfig,
    registry: Arc<CommentRegistry>,
) -> Result<AppServices, StoreError> {
    let store: SharedStore = if config.use_persistent_stores {
        build_persistent_store(config).await?
    } else {
        Arc::new(InMemoryCommentStore::new())
    };

    let loader: Arc<dyn RelationLoader> = Arc::new(InMemoryDirectory::seeded(
        config.relation_engine_version,
        &config.labels,
    )?);

    let translator: Arc<dyn Translator> = Arc::new(EnglishCatalog::new());

    Ok(AppServices {
        registry,
        lifecycle: LifecycleController::new(store.clone(), translator),
        listing: CommentListing::new(store, loader),
    })
}

#[cfg(feature = "postgres")]
async fn build_persistent_store(config: &AppConfig) -> Result<SharedStore, StoreError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| StoreError::Unavailable("USE_PERSISTENT_STORES=true but DATABASE_URL is not set".to_string()))?;

    let store = PostgresCommentStore::connect(url).await?;
    store.ensure_schema().await?;
    tracing::info!("using postgres comment store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn build_persistent_store(_config: &AppConfig) -> Result<SharedStore, StoreError> {
    tracing::warn!(
        "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
    );
    Ok(Arc::new(InMemoryCommentStore::new()))
}
