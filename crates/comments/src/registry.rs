//! Per-namespace registration of the comment feature.
//!
//! [`CommentRegistry::build`] turns settings into one [`CommentRegistration`]
//! per namespace that has comments enabled. The registry is immutable after
//! build; a process installs exactly one via [`install_global`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::Serialize;
use thiserror::Error;

use marginalia_core::{DomainError, NamespaceName};

use crate::comment::PERMITTED_PARAMS;
use crate::i18n::Translator;
use crate::menu::{resolve_menu, MenuEntry};
use crate::order::{ListOrder, OrderParseError};
use crate::scope::{scopes_for, Scope, ScopeFilter, ALL_SCOPE_KEY};
use crate::settings::{CommentSettings, NamespaceSettings};
use crate::view::{Action, IndexView, COMMENT_ACTIONS};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no namespaces configured")]
    NoNamespaces,

    #[error("namespace '{0}' is configured more than once")]
    DuplicateNamespace(String),

    #[error("namespace name '{0}' is reserved")]
    ReservedNamespace(String),

    #[error("invalid namespace name: {0}")]
    InvalidNamespace(#[from] DomainError),

    #[error("namespace '{namespace}': {source}")]
    InvalidOrder {
        namespace: String,
        #[source]
        source: OrderParseError,
    },

    #[error("comment registry already installed")]
    AlreadyInstalled,
}

/// Everything the host needs to expose comments in one namespace.
#[derive(Debug, Clone, Serialize)]
pub struct CommentRegistration {
    pub namespace: NamespaceName,
    pub label: String,
    pub plural_label: String,
    pub menu: MenuEntry,
    pub scopes: Vec<Scope>,
    pub actions: Vec<Action>,
    pub batch_actions: bool,
    pub commentable: bool,
    pub permitted_params: Vec<&'static str>,
    pub index: IndexView,
    pub order: ListOrder,
    pub read_all_namespaces: bool,
}

impl CommentRegistration {
    pub fn allows(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Namespaces whose comments are visible on show pages and resource
    /// panels of this namespace.
    pub fn visible_namespaces(&self) -> ScopeFilter {
        if self.read_all_namespaces {
            ScopeFilter::All
        } else {
            ScopeFilter::Namespace(self.namespace.clone())
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentRegistry {
    namespaces: Vec<NamespaceName>,
    registrations: HashMap<NamespaceName, CommentRegistration>,
}

impl CommentRegistry {
    pub fn build(
        defaults: &CommentSettings,
        namespaces: &[NamespaceSettings],
        translator: &dyn Translator,
    ) -> Result<Self, RegistryError> {
        if namespaces.is_empty() {
            return Err(RegistryError::NoNamespaces);
        }

        let mut names = Vec::with_capacity(namespaces.len());
        for ns in namespaces {
            if ns.name == ALL_SCOPE_KEY {
                return Err(RegistryError::ReservedNamespace(ns.name.clone()));
            }
            let name = NamespaceName::new(ns.name.clone())?;
            if names.contains(&name) {
                return Err(RegistryError::DuplicateNamespace(ns.name.clone()));
            }
            names.push(name);
        }

        let mut registrations = HashMap::new();
        for (ns, name) in namespaces.iter().zip(&names) {
            let settings = ns.inherit(defaults);
            let order: ListOrder =
                settings
                    .order
                    .parse()
                    .map_err(|source| RegistryError::InvalidOrder {
                        namespace: ns.name.clone(),
                        source,
                    })?;

            let plural_label = pluralize(&settings.registration_name);
            let Some(menu) = resolve_menu(
                settings.comments,
                &settings.menu,
                &plural_label,
                &comments_url(name),
            ) else {
                tracing::debug!(namespace = %name, "comments disabled; not registering");
                continue;
            };

            registrations.insert(
                name.clone(),
                CommentRegistration {
                    namespace: name.clone(),
                    label: settings.registration_name.clone(),
                    plural_label,
                    menu,
                    scopes: scopes_for(name, &names, translator),
                    actions: COMMENT_ACTIONS.to_vec(),
                    batch_actions: false,
                    commentable: false,
                    permitted_params: PERMITTED_PARAMS.to_vec(),
                    index: IndexView::build(translator),
                    order,
                    read_all_namespaces: settings.read_all_namespaces,
                },
            );
        }

        Ok(Self {
            namespaces: names,
            registrations,
        })
    }

    /// All configured namespaces, in configuration order.
    pub fn namespaces(&self) -> &[NamespaceName] {
        &self.namespaces
    }

    pub fn knows(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|n| n.as_str() == namespace)
    }

    /// `None` when the namespace is unknown or has comments disabled.
    pub fn registration(&self, namespace: &str) -> Option<&CommentRegistration> {
        let name = NamespaceName::new(namespace).ok()?;
        self.registrations.get(&name)
    }

    pub fn menu_for(&self, namespace: &str) -> Option<&MenuEntry> {
        self.registration(namespace).map(|r| &r.menu)
    }
}

static GLOBAL: OnceLock<Arc<CommentRegistry>> = OnceLock::new();

/// Install the process-wide registry. A second install fails.
pub fn install_global(registry: CommentRegistry) -> Result<Arc<CommentRegistry>, RegistryError> {
    let registry = Arc::new(registry);
    GLOBAL
        .set(registry.clone())
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    Ok(registry)
}

pub fn global() -> Option<Arc<CommentRegistry>> {
    GLOBAL.get().cloned()
}

fn comments_url(namespace: &NamespaceName) -> String {
    format!("/{namespace}/comments")
}

/// English plural for registration labels (`Comment` -> `Comments`).
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if matches!(before_y, Some(c) if !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::EnglishCatalog;
    use crate::menu::{MenuOptions, DEFAULT_MENU_PRIORITY};
    use crate::order::{OrderColumn, SortDirection};

    fn build(namespaces: Vec<NamespaceSettings>) -> Result<CommentRegistry, RegistryError> {
        CommentRegistry::build(&CommentSettings::default(), &namespaces, &EnglishCatalog::new())
    }

    #[test]
    fn registers_each_enabled_namespace() {
        let registry = build(vec![
            NamespaceSettings::named("sales"),
            NamespaceSettings::named("support"),
        ])
        .unwrap();

        let reg = registry.registration("support").unwrap();
        assert_eq!(reg.label, "Comment");
        assert_eq!(reg.menu.label, "Comments");
        assert_eq!(reg.menu.url, "/support/comments");
        assert_eq!(reg.menu.priority, DEFAULT_MENU_PRIORITY);
        assert_eq!(reg.scopes.len(), 3);
        assert!(!reg.batch_actions);
        assert!(!reg.commentable);
        assert!(reg.allows(Action::Destroy));
        assert_eq!(reg.order, ListOrder::default());
        assert_eq!(
            reg.visible_namespaces(),
            ScopeFilter::Namespace(NamespaceName::new("support").unwrap())
        );
    }

    #[test]
    fn disabled_namespace_is_known_but_unregistered() {
        let registry = build(vec![
            NamespaceSettings::named("admin"),
            NamespaceSettings {
                comments: Some(false),
                ..NamespaceSettings::named("ops")
            },
        ])
        .unwrap();

        assert!(registry.knows("ops"));
        assert!(registry.registration("ops").is_none());
        assert!(registry.menu_for("ops").is_none());
        // Scopes still list every namespace.
        assert_eq!(registry.registration("admin").unwrap().scopes.len(), 3);
    }

    #[test]
    fn menu_and_order_overrides_apply() {
        let registry = build(vec![NamespaceSettings {
            registration_name: Some("Note".to_string()),
            order: Some("created_at DESC".to_string()),
            menu: Some(MenuOptions {
                priority: Some(1),
                parent: Some("Audit".to_string()),
                ..MenuOptions::default()
            }),
            read_all_namespaces: Some(true),
            ..NamespaceSettings::named("admin")
        }])
        .unwrap();

        let reg = registry.registration("admin").unwrap();
        assert_eq!(reg.menu.label, "Notes");
        assert_eq!(reg.menu.priority, 1);
        assert_eq!(reg.order.column, OrderColumn::CreatedAt);
        assert_eq!(reg.order.direction, SortDirection::Desc);
        assert!(reg.read_all_namespaces);
        assert_eq!(reg.visible_namespaces(), ScopeFilter::All);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(build(vec![]), Err(RegistryError::NoNamespaces)));
        assert!(matches!(
            build(vec![NamespaceSettings::named("a"), NamespaceSettings::named("a")]),
            Err(RegistryError::DuplicateNamespace(_))
        ));
        assert!(matches!(
            build(vec![NamespaceSettings::named("all")]),
            Err(RegistryError::ReservedNamespace(_))
        ));
        assert!(matches!(
            build(vec![NamespaceSettings::named("bad name")]),
            Err(RegistryError::InvalidNamespace(_))
        ));
        assert!(matches!(
            build(vec![NamespaceSettings {
                order: Some("body".to_string()),
                ..NamespaceSettings::named("admin")
            }]),
            Err(RegistryError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn unknown_namespace_has_no_registration() {
        let registry = build(vec![NamespaceSettings::named("admin")]).unwrap();
        assert!(!registry.knows("sales"));
        assert!(registry.registration("sales").is_none());
        assert!(registry.registration("../admin").is_none());
    }

    #[test]
    fn pluralizes_labels() {
        assert_eq!(pluralize("Comment"), "Comments");
        assert_eq!(pluralize("Entry"), "Entries");
        assert_eq!(pluralize("Day"), "Days");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Match"), "Matches");
    }
}
