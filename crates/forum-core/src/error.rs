//! # AppError
//!
//! Centralized error handling for the forum service.
//! Storage adapters translate their own failures into these variants so the
//! usecases can tell "already exists" apart from everything else.

use thiserror::Error;

/// The primary error type for all forum-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Resource not found (e.g., User, Forum, Thread, Post)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Unique constraint hit on write (e.g., duplicate forum slug)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Input rejected before it reached storage
    #[error("validation error: {0}")]
    Validation(String),

    /// Infrastructure failure (e.g., DB down, broken row)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), key.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }

    /// Prefixes the message with the call site, keeping the variant intact.
    pub fn context(self, at: &str) -> Self {
        match self {
            AppError::NotFound(entity, key) => AppError::NotFound(entity, format!("{key} ({at})")),
            AppError::Conflict(msg) => AppError::Conflict(format!("{at}: {msg}")),
            AppError::Validation(msg) => AppError::Validation(format!("{at}: {msg}")),
            AppError::Internal(msg) => AppError::Internal(format!("{at}: {msg}")),
        }
    }
}

/// A specialized Result type for forum logic.
pub type Result<T> = std::result::Result<T, AppError>;
