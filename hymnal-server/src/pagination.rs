//! Paging of the hymn listing
//!
//! The listing grid shows twelve hymns at a time. A requested page outside
//! the available range is clamped rather than rejected, so a stale link to
//! page 9 of a search that now has two pages lands on page 2.

use hymnal_common::api::types::HymnListResponse;
use hymnal_common::Hymn;

/// Hymns per listing page
pub const PAGE_SIZE: i64 = 12;

/// Where one listing page sits in the full result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingPage {
    /// 1-indexed page actually served
    pub page: i64,
    pub total_pages: i64,
    pub total_results: i64,
}

impl ListingPage {
    /// Page to serve for `requested` given the number of matching hymns
    ///
    /// # Examples
    /// ```
    /// use hymnal_server::pagination::ListingPage;
    ///
    /// // A search matching 30 hymns spans three pages, the last holding 6
    /// let page = ListingPage::clamp(30, 3);
    /// assert_eq!(page.total_pages, 3);
    /// assert_eq!(page.offset(), 24);
    ///
    /// // No matches still serves an (empty) first page
    /// assert_eq!(ListingPage::clamp(0, 4).page, 1);
    /// ```
    pub fn clamp(total_results: i64, requested: i64) -> Self {
        let total_results = total_results.max(0);
        let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
        Self {
            page: requested.clamp(1, total_pages.max(1)),
            total_pages,
            total_results,
        }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * PAGE_SIZE
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// Wrap the hymns of this page into the listing response
    pub fn into_response(self, hymns: Vec<Hymn>) -> HymnListResponse {
        HymnListResponse {
            hymns,
            total_results: self.total_results,
            page: self.page,
            page_size: PAGE_SIZE,
            total_pages: self.total_pages,
        }
    }
}
