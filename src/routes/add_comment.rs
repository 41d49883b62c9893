use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Response,
    Form,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    structs::comment_form::CommentForm,
    utils::{app_error::AppError, auth::redirect_to_login, redirect::redirect_found},
    AppState,
};

pub async fn add_comment_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<String>,
    uri: Uri,
    Form(comment): Form<CommentForm>,
) -> Result<Response, AppError> {
    let post_id: i64 = post_id.parse().map_err(|_| AppError::not_found())?;

    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching post {post_id} for a comment : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(AppError::not_found)?;

    let text = comment.text.trim();
    if !text.is_empty() {
        if let Err(e) =
            sqlx::query("INSERT INTO comments (post_id, author_id, text) VALUES ($1, $2, $3)")
                .bind(post_id)
                .bind(auth_user.id)
                .bind(text)
                .execute(&app_state.pool)
                .await
        {
            warn!(
                "Error inserting comment on post {post_id} by {} : {e}",
                auth_user.id
            );
            return Err(AppError::internal_server_error());
        }
    }

    Ok(redirect_found(&format!("/posts/{post_id}/")))
}
