use serde::{Deserialize, Serialize};

/// Sort direction for listing queries. Ascending unless explicitly requested
/// otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// One page of records plus the total match count independent of pagination.
/// Echoes the effective page number/size back for client-side navigation.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub records: Vec<T>,
    pub total_count: i64,
    pub page_number: i64,
    pub page_size: i64,
}

/// Absent or non-positive page numbers collapse to the first page.
pub(crate) fn effective_page_number(page_number: Option<i64>) -> i64 {
    match page_number {
        Some(n) if n > 0 => n,
        _ => 1,
    }
}

pub(crate) fn effective_page_size(page_size: Option<i64>, default: i64) -> i64 {
    match page_size {
        Some(s) if s > 0 => s,
        _ => default,
    }
}
