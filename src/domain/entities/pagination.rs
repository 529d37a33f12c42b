use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// `limit`/`offset` query parameters shared by every list route.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Normalized offset/limit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { limit: DEFAULT_PAGE_LIMIT, offset: 0 }
    }
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        Pagination {
            limit: query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(Pagination::from(PageQuery::default()), Pagination { limit: 50, offset: 0 });

        let clamped = Pagination::from(PageQuery { limit: Some(10_000), offset: Some(-4) });
        assert_eq!(clamped, Pagination { limit: MAX_PAGE_LIMIT, offset: 0 });

        let zero = Pagination::from(PageQuery { limit: Some(0), offset: Some(20) });
        assert_eq!(zero, Pagination { limit: 1, offset: 20 });
    }
}
