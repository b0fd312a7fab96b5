//! Inheritable comment settings.
//!
//! Application-wide defaults live in [`CommentSettings`]; each namespace may
//! override any of them in its [`NamespaceSettings`]. Unset overrides inherit.

use serde::{Deserialize, Serialize};

use crate::menu::MenuOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentSettings {
    /// Whether comments are registered at all.
    pub comments: bool,
    /// Resource label, also used (pluralized) as the default menu label.
    pub registration_name: String,
    /// Default listing order, settings form (`"created_at ASC"`).
    pub order: String,
    pub menu: MenuOptions,
    /// Whether resource panels and show pages see other namespaces' comments.
    pub read_all_namespaces: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            comments: true,
            registration_name: "Comment".to_string(),
            order: "created_at ASC".to_string(),
            menu: MenuOptions::default(),
            read_all_namespaces: false,
        }
    }
}

/// One administrative namespace and its overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSettings {
    pub name: String,
    #[serde(default)]
    pub comments: Option<bool>,
    #[serde(default)]
    pub registration_name: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub menu: Option<MenuOptions>,
    #[serde(default)]
    pub read_all_namespaces: Option<bool>,
}

impl NamespaceSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Apply application defaults to unset fields.
    pub fn inherit(&self, defaults: &CommentSettings) -> CommentSettings {
        CommentSettings {
            comments: self.comments.unwrap_or(defaults.comments),
            registration_name: self
                .registration_name
                .clone()
                .unwrap_or_else(|| defaults.registration_name.clone()),
            order: self.order.clone().unwrap_or_else(|| defaults.order.clone()),
            menu: self.menu.clone().unwrap_or_else(|| defaults.menu.clone()),
            read_all_namespaces: self
                .read_all_namespaces
                .unwrap_or(defaults.read_all_namespaces),
        }
    }
}
