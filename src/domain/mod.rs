//! Domain types shared by the API, services and CLI.

pub mod errors;
pub mod events;
pub mod validation;

pub use errors::{ErrorCategory, ErrorReport, Severity, format_error};
pub use events::AppEvent;

use serde::Serialize;

/// Validated skip/limit pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// One page of results. `has_more` is computed by over-fetching a single row.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub limit: u64,
    pub has_more: bool,
}

impl<T> Paged<T> {
    /// Builds a page from `limit + 1` fetched rows.
    #[must_use]
    pub fn from_overfetch(mut rows: Vec<T>, pagination: Pagination) -> Self {
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Self {
            items: rows,
            page: pagination.page,
            limit: pagination.limit,
            has_more,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_from_overfetch() {
        let page = Paged::from_overfetch(vec![1, 2, 3], Pagination::new(1, 2));
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_more);

        let page = Paged::from_overfetch(vec![1, 2], Pagination::new(2, 2));
        assert_eq!(page.items, vec![1, 2]);
        assert!(!page.has_more);
        assert_eq!(page.page, 2);
    }
}
