//! Read side of the comment feature: index, show, and the per-resource panel.

use std::sync::Arc;

use serde::Serialize;

use marginalia_comments::{
    select_scope, CommentRegistration, EagerLoadPolicy, ListOrder, ResourceRef, ScopeFilter,
};
use marginalia_core::CommentId;

use crate::comment_store::{CommentQuery, CommentStore, StoreError};
use crate::relations::{present, CommentRow, RelationLoader};

/// A scope tab as shown on the index, with its count when counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeTab {
    pub key: String,
    pub label: String,
    pub is_default: bool,
    pub selected: bool,
    pub count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPage {
    pub scope: String,
    pub order: String,
    pub scopes: Vec<ScopeTab>,
    pub rows: Vec<CommentRow>,
}

pub struct CommentListing<S> {
    store: S,
    loader: Arc<dyn RelationLoader>,
    policy: EagerLoadPolicy,
}

impl<S> CommentListing<S>
where
    S: CommentStore,
{
    /// Negotiates the eager-load policy from the loader's engine version.
    pub fn new(store: S, loader: Arc<dyn RelationLoader>) -> Self {
        let engine = loader.engine_version();
        let policy = EagerLoadPolicy::negotiate(engine);
        tracing::info!(engine = %engine, policy = ?policy, "comment eager-load policy negotiated");
        Self {
            store,
            loader,
            policy,
        }
    }

    /// Index listing. An unknown `scope` falls back to the namespace's
    /// default scope; `order` falls back to the registration's order.
    pub async fn index(
        &self,
        registration: &CommentRegistration,
        scope: Option<&str>,
        order: Option<ListOrder>,
    ) -> Result<IndexPage, StoreError> {
        let selected = select_scope(&registration.scopes, scope);
        let filter = selected
            .map(|s| s.filter.clone())
            .unwrap_or_else(|| ScopeFilter::Namespace(registration.namespace.clone()));
        let order = order.unwrap_or(registration.order);

        let mut scopes = Vec::with_capacity(registration.scopes.len());
        for s in &registration.scopes {
            let count = if s.show_count {
                Some(self.store.count(&s.filter).await?)
            } else {
                None
            };
            scopes.push(ScopeTab {
                key: s.key.clone(),
                label: s.label.clone(),
                is_default: s.is_default,
                selected: selected.is_some_and(|sel| sel.key == s.key),
                count,
            });
        }

        let comments = self
            .store
            .list(&CommentQuery::new(filter).ordered(order))
            .await?;
        let rows = present(self.loader.as_ref(), self.policy, comments).await?;

        Ok(IndexPage {
            scope: selected.map(|s| s.key.clone()).unwrap_or_default(),
            order: order.as_param(),
            scopes,
            rows,
        })
    }

    /// `None` when the comment does not exist. Any row the index can list,
    /// including through the "all" scope, can be shown.
    pub async fn show(&self, id: CommentId) -> Result<Option<CommentRow>, StoreError> {
        let Some(comment) = self.store.get(id).await? else {
            return Ok(None);
        };
        let mut rows = present(self.loader.as_ref(), self.policy, vec![comment]).await?;
        Ok(rows.pop())
    }

    /// Comments attached to one resource, as shown on its detail page.
    ///
    /// Limited to the current namespace unless `read_all_namespaces` is set.
    pub async fn resource_panel(
        &self,
        registration: &CommentRegistration,
        resource: &ResourceRef,
    ) -> Result<Vec<CommentRow>, StoreError> {
        let comments = self
            .store
            .list_for(resource, &registration.visible_namespaces(), registration.order)
            .await?;
        present(self.loader.as_ref(), self.policy, comments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_comments::{
        AuthorRef, CommentDraft, CommentRegistry, CommentSettings, EngineVersion, EnglishCatalog,
        NamespaceSettings, NewComment, SortDirection,
    };
    use marginalia_core::NamespaceName;

    use crate::comment_store::InMemoryCommentStore;
    use crate::relations::InMemoryDirectory;

    fn registry(read_all: bool) -> CommentRegistry {
        let defaults = CommentSettings {
            read_all_namespaces: read_all,
            ..CommentSettings::default()
        };
        CommentRegistry::build(
            &defaults,
            &[NamespaceSettings::named("sales"), NamespaceSettings::named("support")],
            &EnglishCatalog::new(),
        )
        .unwrap()
    }

    fn new_comment(namespace: &str, resource_id: &str, body: &str) -> NewComment {
        CommentDraft {
            resource_type: "Order".to_string(),
            resource_id: resource_id.to_string(),
            body: body.to_string(),
            namespace: Some(NamespaceName::new(namespace).unwrap()),
            author: Some(AuthorRef::new("AdminUser", "1")),
        }
        .validate()
        .unwrap()
    }

    async fn listing() -> CommentListing<Arc<InMemoryCommentStore>> {
        let store = Arc::new(InMemoryCommentStore::new());
        store.create(new_comment("sales", "1", "sales note")).await.unwrap();
        store.create(new_comment("support", "1", "support note")).await.unwrap();
        store.create(new_comment("support", "2", "other order")).await.unwrap();

        let directory = InMemoryDirectory::new(EngineVersion::new(7, 1, 0));
        directory.register_author(AuthorRef::new("AdminUser", "1"), "alice").unwrap();
        CommentListing::new(store, Arc::new(directory))
    }

    #[tokio::test]
    async fn index_defaults_to_current_namespace() {
        let listing = listing().await;
        let registry = registry(false);
        let page = listing
            .index(registry.registration("support").unwrap(), None, None)
            .await
            .unwrap();

        assert_eq!(page.scope, "support");
        assert_eq!(page.rows.len(), 2);
        assert!(page.rows.iter().all(|r| r.namespace.as_str() == "support"));
        assert_eq!(page.rows[0].author, "alice");
        assert_eq!(page.order, "created_at_asc");

        let all = &page.scopes[0];
        assert_eq!(all.key, "all");
        assert_eq!(all.count, None);
        assert_eq!(page.scopes[1].count, Some(1));
        assert_eq!(page.scopes[2].count, Some(2));
        assert!(page.scopes[2].selected);
    }

    #[tokio::test]
    async fn index_all_scope_and_order_override() {
        let listing = listing().await;
        let registry = registry(false);
        let order = ListOrder {
            direction: SortDirection::Desc,
            ..ListOrder::default()
        };
        let page = listing
            .index(registry.registration("sales").unwrap(), Some("all"), Some(order))
            .await
            .unwrap();

        assert_eq!(page.scope, "all");
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.order, "created_at_desc");
    }

    #[tokio::test]
    async fn resource_panel_respects_read_all_namespaces() {
        let listing = listing().await;
        let order_1 = ResourceRef::new("Order", "1");

        let narrow = registry(false);
        let rows = listing
            .resource_panel(narrow.registration("sales").unwrap(), &order_1)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body, "sales note");
        assert_eq!(rows[0].resource, "Order #1");

        let wide = registry(true);
        let rows = listing
            .resource_panel(wide.registration("sales").unwrap(), &order_1)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn rows_listed_under_all_scope_can_be_shown() {
        let listing = listing().await;
        let narrow = registry(false);
        let sales = narrow.registration("sales").unwrap();

        let page = listing.index(sales, Some("all"), None).await.unwrap();
        let foreign = page
            .rows
            .iter()
            .find(|r| r.namespace.as_str() == "support")
            .unwrap();
        assert!(sales.index.row_actions.contains(&marginalia_comments::Action::Show));

        let shown = listing.show(foreign.id).await.unwrap().unwrap();
        assert_eq!(shown.id, foreign.id);
        assert_eq!(shown.namespace.as_str(), "support");
        assert!(listing.show(CommentId::new()).await.unwrap().is_none());
    }
}
