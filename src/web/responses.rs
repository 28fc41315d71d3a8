//! HTTP response types and utilities
//!
//! Standardized response envelope and the mapping from `AppError` variants
//! onto HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::errors::{AppError, AppResult};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        let total_pages = if per_page > 0 {
            total.div_ceil(per_page)
        } else {
            1
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

/// Convert an AppResult into a JSON HTTP response
pub fn handle_result<T>(result: AppResult<T>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))).into_response(),
        Err(error) => handle_error(error),
    }
}

/// Map AppError variants to HTTP status codes
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = match &error {
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            format!("{resource} with id '{id}' not found"),
        ),
        AppError::Duplicate { resource, value } => (
            StatusCode::CONFLICT,
            format!("{resource} '{value}' already exists"),
        ),
        AppError::Upstream { service, message } => (
            StatusCode::BAD_GATEWAY,
            format!("upstream service error ({service}): {message}"),
        ),
        AppError::Http(_) => (
            StatusCode::BAD_GATEWAY,
            "external service communication failed".to_string(),
        ),
        AppError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "database operation failed".to_string(),
        ),
        AppError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("configuration error: {message}"),
        ),
        AppError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("internal error: {message}"),
        ),
    };

    (status, Json(ApiResponse::error(message))).into_response()
}
