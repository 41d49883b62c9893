use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use hyper::StatusCode;
use tracing::warn;

use crate::templates::NotFoundTemplate;

#[derive(Debug)]
pub struct AppError {
    status_code: StatusCode,
    message: Option<String>,
}

impl AppError {
    pub fn new(status_code: StatusCode, message: Option<&str>) -> Self {
        Self {
            status_code,
            message: message.map(str::to_string),
        }
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    pub fn forbidden_error(message: Option<&str>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status_code
    }

    /// The user-facing message, for routes that re-render a form instead of
    /// surfacing the error response directly.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status_code == StatusCode::NOT_FOUND {
            let template = NotFoundTemplate { current_user: None };
            return match template.render() {
                Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
                Err(e) => {
                    warn!("Error rendering 404 template : {e}");
                    StatusCode::NOT_FOUND.into_response()
                }
            };
        }

        match self.message {
            Some(message) => (self.status_code, message).into_response(),
            None => self.status_code.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_custom_template() {
        let response = AppError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn status_is_kept() {
        let error = AppError::forbidden_error(Some("nope"));
        assert_eq!(error.status(), StatusCode::FORBIDDEN);
    }
}
