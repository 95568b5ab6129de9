use critique_core::Page;
use serde::{Deserialize, Serialize};

/// Default page size when the client sends no `limit`.
pub const DEFAULT_LIMIT: i64 = 10;
/// Hard ceiling on the page size.
pub const MAX_LIMIT: i64 = 100;

/// Limit/offset query parameters, shared by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageParams {
    /// Clamps the raw parameters into an executable page.
    pub fn page(self) -> Page {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        Page::new(limit, offset)
    }
}

/// List response envelope: the total count plus the requested window.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(count: i64, results: Vec<T>) -> Self {
        Self { count, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        let page = PageParams {
            limit: Some(10_000),
            offset: Some(-5),
        }
        .page();
        assert_eq!(page.limit, MAX_LIMIT);
        assert_eq!(page.offset, 0);

        let page = PageParams::default().page();
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.offset, 0);

        let page = PageParams {
            limit: Some(0),
            offset: None,
        }
        .page();
        assert_eq!(page.limit, 1);
    }
}
