use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use marginalia_comments::{Comment, NewComment, ScopeFilter};
use marginalia_core::CommentId;

use super::r#trait::{CommentQuery, CommentStore, StoreError};

/// In-memory comment store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryCommentStore {
    comments: RwLock<HashMap<CommentId, Comment>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-materialized comment (fixtures, imports).
    pub fn seed(&self, comment: Comment) -> Result<(), StoreError> {
        let mut map = self.write()?;
        if map.contains_key(&comment.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "comment {} already exists",
                comment.id_typed()
            )));
        }
        map.insert(comment.id_typed(), comment);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<CommentId, Comment>>, StoreError> {
        self.comments
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<CommentId, Comment>>, StoreError> {
        self.comments
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let stored = Comment::persisted(comment, CommentId::new(), Utc::now());
        self.write()?.insert(stored.id_typed(), stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn destroy(&self, id: CommentId) -> Result<(), StoreError> {
        match self.write()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn list(&self, query: &CommentQuery) -> Result<Vec<Comment>, StoreError> {
        let map = self.read()?;
        let mut out: Vec<Comment> = map.values().filter(|c| query.matches(c)).cloned().collect();
        out.sort_by(|a, b| query.order.compare(a, b));
        Ok(out)
    }

    async fn count(&self, namespace: &ScopeFilter) -> Result<u64, StoreError> {
        let map = self.read()?;
        Ok(map.values().filter(|c| namespace.matches(c.namespace())).count() as u64)
    }
}
