// src/models/pagination.rs
// DOCUMENTATION: Offset pagination and response envelopes
// PURPOSE: Parse ?limit=&page=&sort= and build the list envelope

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CrmError;

/// List query parameters
/// DOCUMENTATION: DTO for the query string of list endpoints
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    /// Results per page
    pub limit: Option<i64>,

    /// Page number (1-based)
    pub page: Option<i64>,

    /// created_at, -created_at, updated_at or -updated_at
    pub sort: Option<String>,
}

/// Accepted sort criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    CreatedAtAsc,
    CreatedAtDesc,
    UpdatedAtAsc,
    UpdatedAtDesc,
}

impl SortOrder {
    /// ORDER BY clause, id breaks ties so pages are stable
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::CreatedAtAsc => "created_at ASC, id ASC",
            SortOrder::CreatedAtDesc => "created_at DESC, id DESC",
            SortOrder::UpdatedAtAsc => "updated_at ASC, id ASC",
            SortOrder::UpdatedAtDesc => "updated_at DESC, id DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortOrder::CreatedAtAsc),
            "-created_at" => Ok(SortOrder::CreatedAtDesc),
            "updated_at" => Ok(SortOrder::UpdatedAtAsc),
            "-updated_at" => Ok(SortOrder::UpdatedAtDesc),
            other => Err(CrmError::ValidationError(format!(
                "The sorting criteria is invalid: {}",
                other
            ))),
        }
    }
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
    pub sort: SortOrder,
}

impl PageRequest {
    /// Build a page window from raw query parameters
    /// DOCUMENTATION: limit defaults to `default_limit` and may not exceed `max_limit`
    /// page below 1 is clamped to 1
    pub fn from_query(
        query: &ListQuery,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Self, CrmError> {
        let per_page = query.limit.unwrap_or(default_limit);
        if per_page < 1 {
            return Err(CrmError::ValidationError(
                "The limit parameter must be at least 1".to_string(),
            ));
        }
        if per_page > max_limit {
            return Err(CrmError::ValidationError(format!(
                "The limit parameter is too big (maximum {})",
                max_limit
            )));
        }

        let sort = match query.sort.as_deref() {
            Some(s) => s.parse()?,
            None => SortOrder::default(),
        };

        Ok(PageRequest {
            page: query.page.unwrap_or(1).max(1),
            per_page,
            sort,
        })
    }

    /// Rows to skip; saturates so absurd page numbers just land past the end
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Paginated list envelope
/// DOCUMENTATION: { data, total, current_page, per_page, last_page, from, to }
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,

    /// Total number of matches (regardless of pagination)
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,

    /// 1-based position of the first item on this page
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: i64, page: &PageRequest) -> Self {
        let last_page = ((total + page.per_page - 1) / page.per_page).max(1);
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = page.offset().saturating_add(1);
            (Some(from), Some(from.saturating_add(data.len() as i64 - 1)))
        };

        PaginatedResponse {
            data,
            total,
            current_page: page.page,
            per_page: page.per_page,
            last_page,
            from,
            to,
        }
    }
}

/// Single resource envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Returned by DELETE endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: bool,
    pub id: i64,
}
