use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::post::Post,
    templates::{FollowTemplate, PageNav, PostCard},
    utils::{
        app_error::AppError,
        auth::redirect_to_login,
        pagination::{PaginationParams, Paginator, POSTS_PER_PAGE},
    },
    AppState,
};

pub async fn follow_index_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    uri: Uri,
    Query(pagination_params): Query<PaginationParams>,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM posts p \
         JOIN follows f ON f.followed_id = p.author_id \
         WHERE f.follower_id = $1",
    )
    .bind(auth_user.id)
    .fetch_one(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error counting feed posts for user {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    let page = Paginator::new(total, POSTS_PER_PAGE).page(pagination_params.page);

    let posts = sqlx::query_as::<_, Post>(
        "SELECT p.id, p.text, p.image, p.created_at, u.username AS author_username, \
         g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         JOIN follows f ON f.followed_id = p.author_id \
         JOIN users u ON u.id = p.author_id \
         LEFT JOIN groups g ON g.id = p.group_id \
         WHERE f.follower_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3",
    )
    .bind(auth_user.id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching feed posts for user {} : {e}", auth_user.id);
        AppError::internal_server_error()
    })?;

    let template = FollowTemplate {
        current_user: Some(auth_user.username),
        posts: posts.into_iter().map(PostCard::from).collect(),
        page: PageNav::from(&page),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering follow template : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Html(body).into_response())
}
