use serde::Deserialize;

/// Offset-based page request.
///
/// `page_number` is 1-based. Neither field is validated here; a
/// `page_number` of 0 underflows to an offset of 0 rather than panicking,
/// and a `page_size` of 0 returns an empty page. Callers own validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page_number: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Rows to skip: `(page_number - 1) * page_size`.
    pub fn offset(&self) -> usize {
        self.page_number.saturating_sub(1) * self.page_size
    }

    pub fn limit(&self) -> usize {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
        }
    }
}
