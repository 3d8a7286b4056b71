//! Offset-based pagination types
//!
//! Search results are returned as zero-indexed pages with element and page
//! totals, so clients can render page controls without a second count call.
//!
//! # Usage
//!
//! ```rust,ignore
//! let page = store.search(&query).await?;
//! let hits = page.map(|listing| to_response(listing));
//! ```

use serde::{Deserialize, Serialize};

/// One page of results plus the totals for the whole result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page, in ranked order.
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: i64,
    /// Requested page size (the last page may hold fewer items).
    pub size: i64,
    /// Total matching elements across all pages.
    pub total_elements: i64,
    /// Total page count for this size.
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Build a page, deriving `total_pages` from the element count.
    pub fn new(items: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Page {
            items,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// A page with no results.
    pub fn empty(page: i64, size: i64) -> Self {
        Self::new(Vec::new(), page, size, 0)
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform every item on the page, keeping the pagination metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
