//! Navigation entry for the comment feature.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MENU_PRIORITY: i32 = 10;

/// Per-namespace menu configuration. An empty mapping means default
/// placement and label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuOptions {
    pub label: Option<String>,
    pub priority: Option<i32>,
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    pub url: String,
    pub priority: i32,
    pub parent: Option<String>,
}

/// Resolve the menu entry for one namespace.
///
/// Disabled comments yield `None`: the feature is unregistered, not hidden.
pub fn resolve_menu(
    comments_enabled: bool,
    options: &MenuOptions,
    default_label: &str,
    url: &str,
) -> Option<MenuEntry> {
    if !comments_enabled {
        return None;
    }

    Some(MenuEntry {
        id: "comments".to_string(),
        label: options
            .label
            .clone()
            .unwrap_or_else(|| default_label.to_string()),
        url: url.to_string(),
        priority: options.priority.unwrap_or(DEFAULT_MENU_PRIORITY),
        parent: options.parent.clone(),
    })
}
