//! Query specifications and the paged result envelope.
//!
//! A cached read is described by a [`PageRequest`] (pagination + ordering)
//! combined with an entity-specific filter; the cached value is a
//! [`PagedResponse`] for `list` scope or a plain `Vec` for `all` scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_SORT_FIELD: &str = "id";

/// Sort direction for paginated reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Wire form used in cache keys and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = std::convert::Infallible;

    /// Lenient parse: anything that is not a descending spelling sorts
    /// ascending, matching how the system of record interprets the query
    /// parameter.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.to_ascii_lowercase().as_str() {
            "desc" | "descending" => Self::Descending,
            _ => Self::Ascending,
        })
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Pagination and ordering half of a query specification.
///
/// `page` is 0-indexed on the way in; [`PagedResponse`] re-exposes it
/// 1-indexed for the outward representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort_by: impl Into<String>, sort_direction: SortDirection) -> Self {
        Self {
            page,
            size,
            sort_by: sort_by.into(),
            sort_direction,
        }
    }
}

/// Generic envelope for one page of results plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub content: Vec<T>,
    /// 1-indexed page number as presented to consumers.
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PagedResponse<T> {
    /// Build an envelope from a page of content. Expects `page` to be
    /// 1-indexed (first page = 1).
    pub fn of(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        let total_pages = if size > 0 {
            total_elements.div_ceil(u64::from(size)) as u32
        } else {
            0
        };

        Self {
            first: page == 1,
            last: page >= total_pages,
            empty: content.is_empty(),
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }
}
