// (total count, page request) -> offset/limit for a bounded fetch.

use crate::models::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub offset: u64,
    pub limit: u64,
}

impl PageBounds {
    /// SQLite binds are i64; anything larger saturates.
    pub(crate) fn offset_i64(&self) -> i64 {
        i64::try_from(self.offset).unwrap_or(i64::MAX)
    }

    pub(crate) fn limit_i64(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

/// No pagination returns everything. The offset is not clamped to the count:
/// a page past the end simply yields no rows.
pub fn resolve(total_count: u64, pagination: Option<&Pagination>) -> PageBounds {
    match pagination {
        None => PageBounds {
            offset: 0,
            limit: total_count,
        },
        Some(p) => PageBounds {
            offset: u64::from(p.page_size) * u64::from(p.page),
            limit: u64::from(p.page_size),
        },
    }
}
