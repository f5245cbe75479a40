//! Offset-based pagination over admin API collections.
//!
//! A page answer looks like `{"data": [...], "next": "/groups?offset=..",
//! "offset": ".."}`. `next` is null on the last page; the `offset` cursor is
//! opaque and only ever echoed back to the server.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

/// Page size used when walking a whole collection.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Pagination and filtering state for one list call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOpt {
    pub size: Option<usize>,
    pub offset: Option<String>,
    pub tags: Vec<String>,
    /// Require every tag instead of any of them.
    pub match_all_tags: bool,
}

impl ListOpt {
    pub fn with_size(size: usize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(size) = self.size {
            query.push(("size".to_string(), size.to_string()));
        }
        if let Some(offset) = &self.offset {
            query.push(("offset".to_string(), offset.clone()));
        }
        if !self.tags.is_empty() {
            let sep = if self.match_all_tags { "/" } else { "," };
            query.push(("tags".to_string(), self.tags.join(sep)));
        }
        query
    }

    /// Options for the page after `page`, or `None` when `page` was the last.
    ///
    /// A page announcing `next` without an `offset` cursor is rejected; it
    /// would otherwise restart the walk from the first page.
    pub(crate) fn next_from(&self, page: &ListPage) -> Result<Option<ListOpt>, ApiError> {
        if page.next.is_none() {
            return Ok(None);
        }
        let offset = page.offset.clone().ok_or_else(|| {
            ApiError::DeserializationError("page has `next` but no `offset`".to_string())
        })?;
        Ok(Some(ListOpt {
            offset: Some(offset),
            ..self.clone()
        }))
    }
}

/// Raw page envelope; records stay opaque until a service decodes them.
#[derive(Debug, Deserialize)]
pub(crate) struct ListPage {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}
