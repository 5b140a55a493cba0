use crate::request::Pagination as PageRequest;

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    limit: i64,
    offset: Option<i64>,
}

impl Pagination {
    pub fn new(limit: i64, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn to_sql_clause(&self) -> String {
        let mut stmt = format!(" LIMIT {} ", self.limit());
        if self.offset.is_some() {
            stmt.push_str(&format!("OFFSET {}", self.offset()));
        }
        stmt
    }
}

impl From<&PageRequest> for Pagination {
    fn from(req: &PageRequest) -> Self {
        let size = req.size.clamp(1, 100);
        let page = req.page.max(1);
        // Pages past the end saturate instead of overflowing.
        Self::new(size, Some((page - 1).saturating_mul(size)))
    }
}
