//! Application error types with HTTP status conversion.

use thiserror::Error;

/// Application-level errors for the video game catalog.
#[derive(Error, Debug)]
pub enum AppError {
    // Storage errors
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {message}")]
    Query { message: String, query: String },

    #[error("Internal error: {0}")]
    Internal(String),

    // Domain errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    // Page rendering
    #[error("Template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    /// Not-found error for a video game id.
    pub fn game_not_found(id: i64) -> Self {
        AppError::NotFound(format!("video game {} not found", id))
    }

    /// Whether the error originated in the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Connection(_) | AppError::Query { .. } | AppError::Internal(_)
        )
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Connection(_) => "CONNECTION_ERROR",
            AppError::Query { .. } => "QUERY_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
        }
    }
}
