use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::backend::BackendError;

/// Failures that escape a handler. Auth, validation and not-found outcomes
/// are rendered as pages or notices and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Backend(e) => {
                tracing::error!("Backend error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "The network did not respond. Please try again.".to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_failure_returns_502() {
        assert_eq!(
            response_status(BackendError::Unavailable.into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn template_failure_returns_500() {
        assert_eq!(
            response_status(askama::Error::Fmt(std::fmt::Error).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
