use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use hyper::StatusCode;
use tracing::warn;

use crate::{extractors::auth_extractor::AuthUser, templates::NotFoundTemplate, utils::app_error::AppError};

pub async fn not_found_route(AuthUser(auth_user): AuthUser) -> Result<Response, AppError> {
    let template = NotFoundTemplate {
        current_user: auth_user.map(|user| user.username),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering 404 template : {e}");
        AppError::internal_server_error()
    })?;
    Ok((StatusCode::NOT_FOUND, Html(body)).into_response())
}
