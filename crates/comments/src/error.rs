use serde::Serialize;
use thiserror::Error;

use marginalia_core::NamespaceName;

/// Which creation field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentField {
    Body,
    Resource,
    ResourceType,
    Namespace,
    Author,
}

impl CommentField {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentField::Body => "body",
            CommentField::Resource => "resource",
            CommentField::ResourceType => "resource_type",
            CommentField::Namespace => "namespace",
            CommentField::Author => "author",
        }
    }
}

impl core::fmt::Display for CommentField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error("validation failed on {field}")]
    Validation { field: CommentField },

    #[error("comments are disabled in namespace '{0}'")]
    FeatureDisabled(NamespaceName),
}

impl CommentError {
    pub fn validation(field: CommentField) -> Self {
        Self::Validation { field }
    }
}
