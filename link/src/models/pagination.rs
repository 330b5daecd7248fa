use serde::{Deserialize, Serialize};

use crate::error::{BatchLinkError, Result};

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Which slice of each operation's rows the backend should return.
///
/// Sent as `PageNo` / `NoOfLines`. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}

impl Pagination {
    /// Build and validate a page request
    pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
        let pagination = Self {
            page_number,
            page_size,
        };
        pagination.validate()?;
        Ok(pagination)
    }

    pub fn first_page(page_size: u32) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    /// The following page with the same size
    pub fn next_page(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            page_size: self.page_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_number < 1 {
            return Err(BatchLinkError::InvalidBatch(format!(
                "page number must be >= 1 (got {})",
                self.page_number
            )));
        }
        if self.page_size < 1 {
            return Err(BatchLinkError::InvalidBatch(format!(
                "page size must be >= 1 (got {})",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Number of rows preceding this page
    pub fn offset(&self) -> usize {
        (self.page_number.saturating_sub(1) as usize) * self.page_size as usize
    }
}
