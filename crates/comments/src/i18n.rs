//! Localized string lookup.
//!
//! The host dashboard normally owns translations; [`EnglishCatalog`] is the
//! built-in fallback so the subsystem renders sensibly on its own.

use std::collections::HashMap;

/// Translation keys used by the comment subsystem.
pub mod keys {
    pub const ERROR_EMPTY_TEXT: &str = "comments.errors.empty_text";
    pub const RESOURCE_TYPE: &str = "comments.resource_type";
    pub const AUTHOR_TYPE: &str = "comments.author_type";
    pub const RESOURCE: &str = "comments.resource";
    pub const AUTHOR: &str = "comments.author";
    pub const BODY: &str = "comments.body";
    pub const CREATED_AT: &str = "comments.created_at";
    pub const SCOPE_ALL: &str = "comments.scopes.all";
}

pub trait Translator: Send + Sync {
    /// Look up `key`. Missing keys come back verbatim.
    fn translate(&self, key: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct EnglishCatalog {
    entries: HashMap<&'static str, &'static str>,
}

impl EnglishCatalog {
    pub fn new() -> Self {
        let entries = HashMap::from([
            (keys::ERROR_EMPTY_TEXT, "Comment wasn't saved, text was empty."),
            (keys::RESOURCE_TYPE, "Resource Type"),
            (keys::AUTHOR_TYPE, "Author Type"),
            (keys::RESOURCE, "Resource"),
            (keys::AUTHOR, "Author"),
            (keys::BODY, "Body"),
            (keys::CREATED_AT, "Created At"),
            (keys::SCOPE_ALL, "All"),
        ]);
        Self { entries }
    }
}

impl Default for EnglishCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for EnglishCatalog {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }
}
