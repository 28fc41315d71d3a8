//! Error type definitions for the playlist service
//!
//! The taxonomy mirrors the failure-handling policy of the core subsystems:
//! catalog sync surfaces `Upstream` and aborts without partial commit, the
//! authorization relay logs and swallows, and entity lookups raise `NotFound`.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Unique-constraint violations on create/rename
    #[error("Duplicate {resource}: '{value}' already exists")]
    Duplicate { resource: String, value: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Upstream service unreachable or erroring (media server, auth directory)
    #[error("Upstream service error: {service} - {message}")]
    Upstream { service: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Shorthand for a `NotFound` error
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a `Duplicate` error
    pub fn duplicate(resource: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            resource: resource.into(),
            value: value.into(),
        }
    }

    /// Shorthand for a `Validation` error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an `Upstream` error
    pub fn upstream(service: impl Into<String>, message: impl ToString) -> Self {
        Self::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }
}
