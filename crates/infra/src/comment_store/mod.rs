//! Comment persistence boundary.
//!
//! [`CommentStore`] is the only owner of comment records. Backends: an
//! in-memory map for dev/tests and, behind the `postgres` feature, a SQLx
//! Postgres table.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCommentStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCommentStore;
pub use r#trait::{CommentQuery, CommentStore, StoreError};
