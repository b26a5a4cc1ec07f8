//! View models and askama components shared by the page controllers.

pub mod filter;
pub mod format;
pub mod forms;
pub mod notice;
pub mod post;
pub mod shell;

use askama::Template;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::AppResult;

pub use notice::{Notice, NoticeLevel};
pub use shell::Shell;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// Render a component to a string for embedding in a page.
pub fn render<T: Template>(template: &T) -> AppResult<String> {
    Ok(template.render()?)
}
