//! Page request normalization and the pagination envelope

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE: i64 = 1_000_000;

/// Normalized page/page_size pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Missing, zero or negative values fall back to page 1 / 10 per page.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Pagination metadata returned alongside list data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_items = total_items.max(0);
        let total_pages = ((total_items + request.page_size - 1) / request.page_size).max(1);

        Self {
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// A page of results plus its metadata
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_values_use_defaults() {
        assert_eq!(PageRequest::new(Some(0), Some(-5)), PageRequest { page: 1, page_size: 10 });
        assert_eq!(PageRequest::new(Some(-3), None), PageRequest { page: 1, page_size: 10 });
        assert_eq!(PageRequest::new(None, Some(0)), PageRequest { page: 1, page_size: 10 });
    }

    #[test]
    fn page_size_is_capped() {
        assert_eq!(PageRequest::new(Some(2), Some(10_000)).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(Some(3), Some(25));
        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn huge_page_numbers_are_capped() {
        let request = PageRequest::new(Some(i64::MAX), Some(10));
        assert_eq!(request.page, MAX_PAGE);
        assert_eq!(request.offset(), (MAX_PAGE - 1) * 10);
    }

    #[test]
    fn total_pages_rounds_up() {
        let pagination = Pagination::new(PageRequest::new(Some(1), Some(10)), 21);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let pagination = Pagination::new(PageRequest::new(None, None), 0);
        assert_eq!(pagination.total_pages, 1);
        assert!(!pagination.has_next);
        assert!(!pagination.has_prev);
    }

    #[test]
    fn last_page_has_prev_but_no_next() {
        let pagination = Pagination::new(PageRequest::new(Some(2), Some(10)), 20);
        assert_eq!(pagination.total_pages, 2);
        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }
}
