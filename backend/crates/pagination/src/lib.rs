//! Offset pagination primitives shared by listing endpoints.
//!
//! A [`PageRequest`] carries the caller-supplied `limit` and 1-indexed
//! `page`. Values are taken as given: no clamping is applied, so a zero or
//! negative page propagates to the storage layer as a zero or negative
//! offset. The only rejection happens when the offset cannot be represented
//! as an `i64`.

use serde::{Deserialize, Serialize};

/// Default number of rows per page when the caller omits `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Default page number when the caller omits `page`.
pub const DEFAULT_PAGE: i64 = 1;

/// Errors raised while deriving storage offsets from a page request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// `limit * (page - 1)` does not fit in an `i64`.
    #[error("page offset overflows for limit {limit} and page {page}")]
    OffsetOverflow {
        /// Requested page size.
        limit: i64,
        /// Requested page number.
        page: i64,
    },
}

/// Caller-supplied offset pagination request.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(25, 3);
/// assert_eq!(request.offset(), Ok(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of rows on the page.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// 1-indexed page number.
    #[serde(default = "default_page")]
    pub page: i64,
}

const fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

const fn default_page() -> i64 {
    DEFAULT_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: DEFAULT_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a page request from raw values.
    #[must_use]
    pub const fn new(limit: i64, page: i64) -> Self {
        Self { limit, page }
    }

    /// Number of rows to skip: `limit * (page - 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError::OffsetOverflow`] when the arithmetic
    /// overflows `i64`.
    pub const fn offset(&self) -> Result<i64, PaginationError> {
        let overflow = PaginationError::OffsetOverflow {
            limit: self.limit,
            page: self.page,
        };
        let Some(preceding) = self.page.checked_sub(1) else {
            return Err(overflow);
        };
        match self.limit.checked_mul(preceding) {
            Some(offset) => Ok(offset),
            None => Err(overflow),
        }
    }
}
