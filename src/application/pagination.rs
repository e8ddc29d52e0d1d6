//! Offset pagination envelopes shared by every list endpoint.
//!
//! Validation policy is **reject**: a zero page or page size, or a sort field
//! outside an entity's allow-list, is a client error. Nothing is clamped, so
//! a caller can never silently receive a different page than it asked for.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be a positive integer")]
    InvalidPage,
    #[error("pageSize must be a positive integer")]
    InvalidPageSize,
    #[error("unknown sort field `{0}`")]
    UnknownSortField(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
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

/// Validated page window plus sort selection.
///
/// `page` and `page_size` are private so the `≥ 1` invariant set at
/// construction holds everywhere downstream, keeping the offset computation
/// `(page - 1) * page_size` non-negative by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
    sort_field: Option<String>,
    sort_direction: SortDirection,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if page_size == 0 {
            return Err(PaginationError::InvalidPageSize);
        }
        Ok(Self {
            page,
            page_size,
            sort_field: None,
            sort_direction: SortDirection::Asc,
        })
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = direction;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

/// Uniform result envelope for one page of a filtered listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    /// Assemble the envelope for one executed page window.
    ///
    /// `current_page` is taken from the request unclamped: a past-the-end
    /// page legitimately produces empty `items` with the true `total_count`.
    pub fn assemble(items: Vec<T>, total_count: u64, request: &PageRequest) -> Self {
        let page_size = request.page_size();
        let total_pages = total_count
            .div_ceil(u64::from(page_size))
            .try_into()
            .unwrap_or(u32::MAX);

        Self {
            items,
            total_count,
            current_page: request.page(),
            total_pages,
            page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            current_page: self.current_page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_is_rejected() {
        assert_eq!(PageRequest::new(0, 10), Err(PaginationError::InvalidPage));
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(PageRequest::new(1, 0), Err(PaginationError::InvalidPageSize));
    }

    #[test]
    fn offset_follows_page_window() {
        let request = PageRequest::new(3, 10).expect("valid request");
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        let request = PageRequest::new(1, 10).expect("valid request");
        let result = PageResult::assemble(vec![(); 10], 25, &request);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.total_count, 25);
    }

    #[test]
    fn total_pages_is_zero_only_for_empty_sets() {
        let request = PageRequest::new(1, 10).expect("valid request");

        let empty = PageResult::<()>::assemble(vec![], 0, &request);
        assert_eq!(empty.total_pages, 0);

        let single = PageResult::<()>::assemble(vec![], 1, &request);
        assert_eq!(single.total_pages, 1);
    }

    #[test]
    fn past_the_end_page_is_not_clamped() {
        let request = PageRequest::new(4, 10).expect("valid request");
        let result = PageResult::<()>::assemble(vec![], 25, &request);
        assert_eq!(result.current_page, 4);
        assert!(result.items.is_empty());
        assert_eq!(result.total_count, 25);
    }

    #[test]
    fn map_preserves_the_envelope() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let result = PageResult::assemble(vec![1, 2], 5, &request).map(|n| n * 10);
        assert_eq!(result.items, vec![10, 20]);
        assert_eq!(result.current_page, 2);
        assert_eq!(result.total_pages, 3);
    }
}
