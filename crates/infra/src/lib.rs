//! Infrastructure layer: comment storage, relation loading, the comment
//! lifecycle, and configuration.

pub mod comment_store;
pub mod config;
pub mod lifecycle;
pub mod listing;
pub mod relations;

pub use comment_store::{CommentQuery, CommentStore, InMemoryCommentStore, StoreError};
#[cfg(feature = "postgres")]
pub use comment_store::PostgresCommentStore;
pub use config::{AppConfig, ConfigError};
pub use lifecycle::{
    CreateRequest, DestroyRequest, Flash, LifecycleController, LifecycleError, LifecycleOutcome,
};
pub use listing::{CommentListing, IndexPage, ScopeTab};
pub use relations::{
    present, AuthorLabel, CommentRow, DirectoryLabels, InMemoryDirectory, RelationLoader,
    ResourceLabel,
};
