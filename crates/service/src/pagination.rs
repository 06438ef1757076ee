//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use std::ops::Range;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Pagination parameters as received from the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: i64,
    /// items per page
    pub page_size: i64,
}

impl Pagination {
    /// Replace a non-positive page size with the default. `page` is kept as given.
    pub fn normalize(self) -> Self {
        let page_size = if self.page_size <= 0 { DEFAULT_PAGE_SIZE } else { self.page_size };
        Self { page: self.page, page_size }
    }

    /// Index range of this page within `total` items; empty when out of range.
    pub fn window(&self, total: usize) -> Range<usize> {
        let Self { page, page_size } = self.normalize();
        if page < 1 {
            return 0..0;
        }
        let start = (page - 1)
            .checked_mul(page_size)
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or(usize::MAX)
            .min(total);
        let len = usize::try_from(page_size).unwrap_or(usize::MAX);
        start..start.saturating_add(len).min(total)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: DEFAULT_PAGE, page_size: DEFAULT_PAGE_SIZE } }
}
