//! Centralized error handling for the playlist service
//!
//! All layers share a single `AppError` hierarchy. Repositories and services
//! return `AppResult<T>`; the web layer maps variants onto HTTP status codes
//! in `web::responses`.

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
