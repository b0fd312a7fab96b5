//! `marginalia-comments`: operator notes attached to any administered resource.
//!
//! This crate is pure: entity, validation, scoping, hooks, and registration.
//! Storage, relation loading and the request lifecycle live in
//! `marginalia-infra`.

pub mod comment;
pub mod eager_load;
pub mod error;
pub mod hook;
pub mod i18n;
pub mod menu;
pub mod order;
pub mod redirect;
pub mod registry;
pub mod scope;
pub mod settings;
pub mod view;

pub use comment::{
    AuthorRef, Comment, CommentDraft, CreateCommentParams, NewComment, ResourceRef,
    PERMITTED_PARAMS,
};
pub use eager_load::{EagerLoadPolicy, EngineVersion, Relation};
pub use error::{CommentError, CommentField};
pub use hook::{BeforeCreate, CreateContext, NamespaceAuthorBinding};
pub use i18n::{EnglishCatalog, Translator};
pub use menu::{resolve_menu, MenuEntry, MenuOptions};
pub use order::{ListOrder, OrderColumn, SortDirection};
pub use redirect::{namespace_root, RedirectBack};
pub use registry::{global, install_global, CommentRegistration, CommentRegistry, RegistryError};
pub use scope::{scopes_for, select_scope, Scope, ScopeFilter};
pub use settings::{CommentSettings, NamespaceSettings};
pub use view::{Action, IndexColumn, IndexView};
