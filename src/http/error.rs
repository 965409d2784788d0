//! HTTP status mapping for [`AppError`].

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::AppError;

/// JSON error body returned by the API.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Connection(_)
            | AppError::Query { .. }
            | AppError::Internal(_)
            | AppError::Config(_)
            | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log server-side failures before they become a response.
    pub(crate) fn log(&self) {
        match self {
            AppError::Query { message, query } => {
                tracing::error!(error = %message, query = %query, "Storage failure")
            }
            e if e.status().is_server_error() => tracing::error!(error = %e, "Request failed"),
            e => tracing::debug!(error = %e, "Request rejected"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = ErrorBody {
            code: self.code(),
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::game_not_found(1).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Connection("down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
