//! Per-namespace visibility filters offered on the comment index.

use serde::Serialize;

use marginalia_core::NamespaceName;

use crate::i18n::{keys, Translator};

/// Key of the unfiltered scope.
pub const ALL_SCOPE_KEY: &str = "all";

/// Predicate a scope applies to the comment listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "namespace", rename_all = "snake_case")]
pub enum ScopeFilter {
    All,
    Namespace(NamespaceName),
}

impl ScopeFilter {
    pub fn matches(&self, namespace: &NamespaceName) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Namespace(n) => n == namespace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub key: String,
    pub label: String,
    pub filter: ScopeFilter,
    pub is_default: bool,
    /// Whether the UI should display a running count. Off for "all", which can
    /// be expensive to count.
    pub show_count: bool,
}

/// Scopes offered while `current` is active.
///
/// "all" comes first, then one scope per namespace in registration order. Only
/// the scope whose key equals `current` is the default.
pub fn scopes_for(
    current: &NamespaceName,
    namespaces: &[NamespaceName],
    translator: &dyn Translator,
) -> Vec<Scope> {
    let mut scopes = Vec::with_capacity(namespaces.len() + 1);
    scopes.push(Scope {
        key: ALL_SCOPE_KEY.to_string(),
        label: translator.translate(keys::SCOPE_ALL),
        filter: ScopeFilter::All,
        is_default: false,
        show_count: false,
    });

    for name in namespaces {
        scopes.push(Scope {
            key: name.as_str().to_string(),
            label: titleize(name.as_str()),
            filter: ScopeFilter::Namespace(name.clone()),
            is_default: name == current,
            show_count: true,
        });
    }

    scopes
}

/// Pick the requested scope, or the default one when the request names none
/// (or names one that is not offered).
pub fn select_scope<'a>(scopes: &'a [Scope], requested: Option<&str>) -> Option<&'a Scope> {
    requested
        .and_then(|key| scopes.iter().find(|s| s.key == key))
        .or_else(|| scopes.iter().find(|s| s.is_default))
}

/// `back_office` -> `Back Office`
pub(crate) fn titleize(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
