//! Postgres-backed comment store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | `Database` | `23505` (unique violation) | `Conflict` |
//! | `Database` | `23514` (check violation) | `Corrupt` |
//! | `Database` | other | `Unavailable` |
//! | `PoolClosed`, `Io`, ... | n/a | `Unavailable` |
//!
//! Single-row insert and delete rely on statement atomicity; no explicit
//! transactions are needed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};

use marginalia_comments::{AuthorRef, Comment, NewComment, ResourceRef, ScopeFilter};
use marginalia_core::{CommentId, NamespaceName};

use super::r#trait::{CommentQuery, CommentStore, StoreError};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id UUID PRIMARY KEY,
        resource_type TEXT NOT NULL,
        resource_id TEXT NOT NULL,
        namespace TEXT NOT NULL,
        author_type TEXT NOT NULL,
        author_id TEXT NOT NULL,
        body TEXT NOT NULL CHECK (length(btrim(body)) > 0),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS comments_resource_idx ON comments (resource_type, resource_id)",
    "CREATE INDEX IF NOT EXISTS comments_namespace_idx ON comments (namespace)",
    "CREATE INDEX IF NOT EXISTS comments_author_idx ON comments (author_type, author_id)",
];

#[derive(Debug, Clone)]
pub struct PostgresCommentStore {
    pool: Arc<PgPool>,
}

impl PostgresCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the comments table and its indexes if they do not exist.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommentStore for PostgresCommentStore {
    #[instrument(
        skip(self, comment),
        fields(namespace = %comment.namespace(), resource_type = %comment.resource().resource_type),
        err
    )]
    async fn create(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let stored = Comment::persisted(comment, CommentId::new(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO comments (
                id,
                resource_type,
                resource_id,
                namespace,
                author_type,
                author_id,
                body,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(stored.id_typed().as_uuid())
        .bind(&stored.resource().resource_type)
        .bind(&stored.resource().resource_id)
        .bind(stored.namespace().as_str())
        .bind(&stored.author().author_type)
        .bind(&stored.author().author_id)
        .bind(stored.body())
        .bind(stored.created_at())
        .bind(stored.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        Ok(stored)
    }

    #[instrument(skip(self), fields(comment_id = %id), err)]
    async fn get(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, resource_type, resource_id, namespace, author_type, author_id,
                   body, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| CommentRow::from_row(&r).and_then(Comment::try_from))
            .transpose()
    }

    #[instrument(skip(self), fields(comment_id = %id), err)]
    async fn destroy(&self, id: CommentId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("destroy", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(
        skip(self, query),
        fields(order = %query.order.as_param(), comment_count = tracing::field::Empty),
        err
    )]
    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError> {
        let span = Span::current();

        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            r#"
            SELECT id, resource_type, resource_id, namespace, author_type, author_id,
                   body, created_at, updated_at
            FROM comments
            WHERE ($1::text IS NULL OR namespace = $1)
                AND ($2::text IS NULL OR resource_type = $2)
                AND ($3::text IS NULL OR resource_id = $3)
            ORDER BY {column} {direction}, id {direction}
            "#,
            column = query.order.column.as_str(),
            direction = query.order.direction.as_sql(),
        );

        let rows = sqlx::query(&sql)
            .bind(namespace_param(&query.namespace))
            .bind(query.resource.as_ref().map(|r| r.resource_type.as_str()))
            .bind(query.resource.as_ref().map(|r| r.resource_id.as_str()))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(Comment::try_from(CommentRow::from_row(&row)?)?);
        }

        span.record("comment_count", comments.len());
        Ok(comments)
    }

    #[instrument(skip(self), err)]
    async fn count(&self, namespace: &ScopeFilter) -> Result<u64, StoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM comments WHERE ($1::text IS NULL OR namespace = $1)",
        )
        .bind(namespace_param(namespace))
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {e}")))?;
        Ok(total as u64)
    }
}

fn namespace_param(filter: &ScopeFilter) -> Option<&str> {
    match filter {
        ScopeFilter::All => None,
        ScopeFilter::Namespace(n) => Some(n.as_str()),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23514") => StoreError::Corrupt(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct CommentRow {
    id: uuid::Uuid,
    resource_type: String,
    resource_id: String,
    namespace: String,
    author_type: String,
    author_id: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, StoreError> {
        let read = |e: sqlx::Error| StoreError::Corrupt(format!("failed to read comment row: {e}"));
        Ok(CommentRow {
            id: row.try_get("id").map_err(read)?,
            resource_type: row.try_get("resource_type").map_err(read)?,
            resource_id: row.try_get("resource_id").map_err(read)?,
            namespace: row.try_get("namespace").map_err(read)?,
            author_type: row.try_get("author_type").map_err(read)?,
            author_id: row.try_get("author_id").map_err(read)?,
            body: row.try_get("body").map_err(read)?,
            created_at: row.try_get("created_at").map_err(read)?,
            updated_at: row.try_get("updated_at").map_err(read)?,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let namespace = NamespaceName::new(row.namespace)
            .map_err(|e| StoreError::Corrupt(format!("comment {}: {e}", row.id)))?;
        Ok(Comment::restore(
            CommentId::from_uuid(row.id),
            ResourceRef::new(row.resource_type, row.resource_id),
            namespace,
            AuthorRef::new(row.author_type, row.author_id),
            row.body,
            row.created_at,
            row.updated_at,
        ))
    }
}
