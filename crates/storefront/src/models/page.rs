//! Pagination envelope for list queries.

use serde::Serialize;

/// One page of results plus the information needed to fetch the next one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Page size requested.
    pub limit: i64,
}

impl<T> Page<T> {
    /// Build a page from items plus the query's paging inputs.
    #[must_use]
    pub const fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            items,
            total,
            page,
            limit,
        }
    }

    /// Number of pages needed to cover `total` at this page size.
    #[must_use]
    pub const fn total_pages(&self) -> i64 {
        if self.limit <= 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.total_pages()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 25, 1, 10);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_more());
    }

    #[test]
    fn test_last_page_has_no_more() {
        let page: Page<i32> = Page::new(vec![], 25, 3, 10);
        assert!(!page.has_more());
    }

    #[test]
    fn test_exact_multiple_does_not_add_a_page() {
        let page: Page<i32> = Page::new(vec![], 30, 3, 10);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_more());
    }

    #[test]
    fn test_zero_limit() {
        let page: Page<i32> = Page::new(vec![], 10, 1, 0);
        assert_eq!(page.total_pages(), 0);
    }
}
