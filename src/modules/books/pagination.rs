//! Page windows and paged results

use library_db::Range;
use serde::{Deserialize, Serialize};

use super::error::BooksError;

/// A validated request for one page. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Accept any `page >= 1` and `page_size >= 1`.
    pub fn new(page: i64, page_size: i64) -> Result<Self, BooksError> {
        Ok(Self {
            page: positive("page", page)?,
            page_size: positive("page_size", page_size)?,
        })
    }

    /// Like [`PageRequest::new`], additionally capping `page_size`.
    pub fn bounded(page: i64, page_size: i64, max_page_size: u32) -> Result<Self, BooksError> {
        let request = Self::new(page, page_size)?;
        if request.page_size > max_page_size {
            return Err(BooksError::InvalidPaginationParameter {
                parameter: "page_size",
                value: page_size,
                reason: format!("must be between 1 and {max_page_size}"),
            });
        }
        Ok(request)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of matching records before the window
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// The window `[offset, offset + page_size)`
    pub fn range(&self) -> Range {
        Range::new(self.offset(), self.limit())
    }
}

fn positive(parameter: &'static str, value: i64) -> Result<u32, BooksError> {
    if value < 1 {
        return Err(BooksError::InvalidPaginationParameter {
            parameter,
            value,
            reason: "must be at least 1".to_string(),
        });
    }
    u32::try_from(value).map_err(|_| BooksError::InvalidPaginationParameter {
        parameter,
        value,
        reason: format!("must be at most {}", u32::MAX),
    })
}

/// One page of results plus the size of the whole matching set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Count of every record matching the filters, independent of the window
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: total.div_ceil(u64::from(request.page_size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_skips_previous_pages() {
        let request = PageRequest::new(1, 10).unwrap();
        assert_eq!(request.offset(), 0);

        let request = PageRequest::new(3, 10).unwrap();
        assert_eq!(request.offset(), 20);
        assert_eq!(request.range(), Range::new(20, 10));
    }

    #[test]
    fn non_positive_values_are_rejected() {
        for (page, page_size, parameter) in [(0, 10, "page"), (-2, 10, "page"), (1, 0, "page_size")] {
            match PageRequest::new(page, page_size) {
                Err(BooksError::InvalidPaginationParameter { parameter: p, .. }) => {
                    assert_eq!(p, parameter)
                }
                other => panic!("expected rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn bounded_caps_page_size() {
        assert!(PageRequest::bounded(1, 100, 100).is_ok());
        let err = PageRequest::bounded(1, 101, 100).unwrap_err();
        assert!(err.to_string().contains("between 1 and 100"));
        assert!(PageRequest::bounded(1, 0, 100).is_err());
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let request = PageRequest::new(i64::from(u32::MAX), i64::from(u32::MAX)).unwrap();
        assert_eq!(
            request.offset(),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
        assert!(PageRequest::new(i64::from(u32::MAX) + 1, 1).is_err());
    }

    #[test]
    fn page_metadata() {
        let page = Page::new(vec![21, 22, 23, 24, 25], 25, PageRequest::new(3, 10).unwrap());
        assert_eq!(page.total_pages, 3);

        let page = Page::new(Vec::<u8>::new(), 0, PageRequest::new(1, 10).unwrap());
        assert_eq!(page.total_pages, 0);

        let page = Page::new(vec![1, 2], 25, PageRequest::new(1, 2).unwrap());
        assert_eq!(page.total_pages, 13);
    }
}
