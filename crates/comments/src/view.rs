//! Index view description handed to the host's rendering layer.

use serde::Serialize;

use crate::i18n::{keys, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexColumn {
    ResourceType,
    AuthorType,
    Resource,
    Author,
    Body,
    CreatedAt,
}

impl IndexColumn {
    pub const ALL: [IndexColumn; 6] = [
        IndexColumn::ResourceType,
        IndexColumn::AuthorType,
        IndexColumn::Resource,
        IndexColumn::Author,
        IndexColumn::Body,
        IndexColumn::CreatedAt,
    ];

    pub fn label_key(self) -> &'static str {
        match self {
            IndexColumn::ResourceType => keys::RESOURCE_TYPE,
            IndexColumn::AuthorType => keys::AUTHOR_TYPE,
            IndexColumn::Resource => keys::RESOURCE,
            IndexColumn::Author => keys::AUTHOR,
            IndexColumn::Body => keys::BODY,
            IndexColumn::CreatedAt => keys::CREATED_AT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Index,
    Show,
    Create,
    Destroy,
}

/// Actions registered for comments. There is no edit/update.
pub const COMMENT_ACTIONS: [Action; 4] = [Action::Index, Action::Show, Action::Create, Action::Destroy];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub column: IndexColumn,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexView {
    pub columns: Vec<ColumnSpec>,
    pub row_actions: Vec<Action>,
}

impl IndexView {
    pub fn build(translator: &dyn Translator) -> Self {
        Self {
            columns: IndexColumn::ALL
                .iter()
                .map(|&column| ColumnSpec {
                    column,
                    label: translator.translate(column.label_key()),
                })
                .collect(),
            row_actions: vec![Action::Show, Action::Destroy],
        }
    }
}
