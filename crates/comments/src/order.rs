//! Listing order for comments.
//!
//! Two textual forms are accepted: the settings form (`"created_at ASC"`) and
//! the query-parameter form (`"created_at_desc"`).

use core::cmp::Ordering;
use core::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::comment::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderColumn {
    CreatedAt,
    UpdatedAt,
    Id,
}

impl OrderColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderColumn::CreatedAt => "created_at",
            OrderColumn::UpdatedAt => "updated_at",
            OrderColumn::Id => "id",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(OrderColumn::CreatedAt),
            "updated_at" => Some(OrderColumn::UpdatedAt),
            "id" => Some(OrderColumn::Id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ListOrder {
    pub column: OrderColumn,
    pub direction: SortDirection,
}

impl Default for ListOrder {
    fn default() -> Self {
        Self {
            column: OrderColumn::CreatedAt,
            direction: SortDirection::Asc,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported comment order '{0}'")]
pub struct OrderParseError(pub String);

impl ListOrder {
    /// Parse the `<column>_<asc|desc>` query form.
    pub fn from_param(raw: &str) -> Result<Self, OrderParseError> {
        let err = || OrderParseError(raw.to_string());
        let (column, direction) = raw.rsplit_once('_').ok_or_else(err)?;
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(err()),
        };
        let column = OrderColumn::parse(column).ok_or_else(err)?;
        Ok(Self { column, direction })
    }

    pub fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        let ord = match self.column {
            OrderColumn::CreatedAt => a.created_at().cmp(&b.created_at()),
            OrderColumn::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            OrderColumn::Id => Ordering::Equal,
        }
        // v7 ids are time-ordered, which makes them a stable tie-breaker.
        .then_with(|| a.id_typed().cmp(&b.id_typed()));

        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    pub fn as_param(&self) -> String {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        format!("{}_{}", self.column.as_str(), dir)
    }
}

impl FromStr for ListOrder {
    type Err = OrderParseError;

    /// Parse the settings form: `"<column> [ASC|DESC]"`, direction optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || OrderParseError(s.to_string());
        let mut words = s.split_whitespace();
        let column = words.next().and_then(OrderColumn::parse).ok_or_else(err)?;
        let direction = match words.next().map(|d| d.to_ascii_uppercase()) {
            None => SortDirection::Asc,
            Some(d) if d == "ASC" => SortDirection::Asc,
            Some(d) if d == "DESC" => SortDirection::Desc,
            Some(_) => return Err(err()),
        };
        if words.next().is_some() {
            return Err(err());
        }
        Ok(Self { column, direction })
    }
}
