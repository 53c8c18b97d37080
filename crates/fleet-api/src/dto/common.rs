//! Common DTOs used across the API

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    /// Create a success response with data and message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 500))]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    50
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    #[inline]
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    #[inline]
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn paginate<T>(&self, data: Vec<T>, total: i64) -> PaginatedResponse<T> {
        PaginatedResponse {
            data,
            pagination: PaginationMeta::new(total, self.page, self.per_page),
        }
    }
}

/// Page position of a list response
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

/// List response with pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_offset() {
        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
        assert_eq!(PaginationParams::default().offset(), 0);
    }

    #[test]
    fn test_pagination_meta_rounds_up() {
        assert_eq!(PaginationMeta::new(95, 1, 10).total_pages, 10);
        assert_eq!(PaginationMeta::new(100, 1, 10).total_pages, 10);
        assert_eq!(PaginationMeta::new(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_api_response() {
        let resp = ApiResponse::success("test");
        assert!(resp.message.is_none());

        let resp = ApiResponse::with_message("data", "Booking created");
        assert_eq!(resp.message.as_deref(), Some("Booking created"));
    }
}
