//! Pagination utilities for service layer
//!
//! `Pagination` normalizes page/limit inputs; `Page<T>` carries one page of
//! results together with the `PageMeta` returned to clients.

use common::types::PageMeta;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Highest page whose offset still fits a signed 64-bit SQL OFFSET at any limit.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    /// Clamp to sane values: page is kept within 1..=MAX_PAGE, limit within 1..=100.
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page: page.clamp(1, MAX_PAGE), limit: limit.clamp(1, MAX_LIMIT) }
    }

    /// Rows to skip before this page, never above `i64::MAX`.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.limit).min(i64::MAX as u64)
    }

    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta { page: self.page, limit: self.limit, total, pages: total_pages(total, self.limit) }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_LIMIT } }
}

/// `ceil(total / limit)`; zero when there is nothing to page through.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// One page of results.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self { items, meta: pagination.meta(total) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), meta: self.meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_zero_to_minimums() {
        let p = Pagination::new(0, 0);
        assert_eq!(p, Pagination { page: 1, limit: 1 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn new_clamps_upper_bound() {
        let p = Pagination::new(5, 1000);
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset(), 400);
    }

    #[test]
    fn offset_fits_a_signed_sql_offset() {
        let p = Pagination::new(u64::MAX, MAX_LIMIT);
        assert_eq!(p.page, MAX_PAGE);
        assert!(p.offset() <= i64::MAX as u64);

        let raw = Pagination { page: u64::MAX, limit: MAX_LIMIT };
        assert_eq!(raw.offset(), i64::MAX as u64);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 10);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        for limit in 1..=100u64 {
            for total in 0..=250u64 {
                let pages = total_pages(total, limit);
                // smallest page count whose capacity covers every row
                assert!(pages * limit >= total, "total={total} limit={limit}");
                assert!(pages == 0 || (pages - 1) * limit < total, "total={total} limit={limit}");
            }
        }
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn meta_reports_request_and_totals() {
        let meta = Pagination::new(2, 5).meta(12);
        assert_eq!((meta.page, meta.limit, meta.total, meta.pages), (2, 5, 12, 3));
    }
}
