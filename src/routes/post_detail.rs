use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::{comment::Comment, post::Post},
    templates::{CommentCard, PostCard, PostDetailTemplate},
    utils::app_error::AppError,
    AppState,
};

pub async fn post_detail_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Html<String>, AppError> {
    // a non-numeric id is an unknown page, not a bad request
    let post_id: i64 = post_id.parse().map_err(|_| AppError::not_found())?;

    let post = sqlx::query_as::<_, Post>(
        "SELECT p.id, p.text, p.image, p.created_at, u.username AS author_username, \
         g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         JOIN users u ON u.id = p.author_id \
         LEFT JOIN groups g ON g.id = p.group_id \
         WHERE p.id = $1",
    )
    .bind(post_id)
    .fetch_optional(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching post {post_id} : {e}");
        AppError::internal_server_error()
    })?
    .ok_or_else(AppError::not_found)?;

    let comments = sqlx::query_as::<_, Comment>(
        "SELECT c.id, c.text, c.created_at, u.username AS author_username \
         FROM comments c \
         JOIN users u ON u.id = c.author_id \
         WHERE c.post_id = $1 \
         ORDER BY c.created_at DESC, c.id DESC",
    )
    .bind(post_id)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching comments of post {post_id} : {e}");
        AppError::internal_server_error()
    })?;

    let template = PostDetailTemplate {
        current_user: auth_user.map(|user| user.username),
        post: PostCard::from(post),
        comments_count: comments.len() as i64,
        comments: comments.into_iter().map(CommentCard::from).collect(),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering post_detail template : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Html(body))
}
