use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::post::Post,
    templates::{PageNav, PostCard, ProfileTemplate},
    utils::{
        app_error::AppError,
        pagination::{PaginationParams, Paginator, POSTS_PER_PAGE},
    },
    AppState,
};

pub async fn profile_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(username): Path<String>,
    Query(pagination_params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let author_id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(&username)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching profile of `{username}` : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(AppError::not_found)?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error counting posts of `{username}` : {e}");
            AppError::internal_server_error()
        })?;

    let page = Paginator::new(total, POSTS_PER_PAGE).page(pagination_params.page);

    let posts = sqlx::query_as::<_, Post>(
        "SELECT p.id, p.text, p.image, p.created_at, u.username AS author_username, \
         g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         JOIN users u ON u.id = p.author_id \
         LEFT JOIN groups g ON g.id = p.group_id \
         WHERE p.author_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3",
    )
    .bind(author_id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching posts of `{username}` : {e}");
        AppError::internal_server_error()
    })?;

    let (is_self, following) = match &auth_user {
        Some(user) if user.id == author_id => (true, false),
        Some(user) => {
            let following = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
            )
            .bind(user.id)
            .bind(author_id)
            .fetch_one(&app_state.pool)
            .await
            .map_err(|e| {
                warn!("Error checking follow state for `{username}` : {e}");
                AppError::internal_server_error()
            })?;
            (false, following)
        }
        None => (false, false),
    };

    let template = ProfileTemplate {
        current_user: auth_user.map(|user| user.username),
        author_username: username,
        posts_count: total,
        following,
        is_self,
        posts: posts.into_iter().map(PostCard::from).collect(),
        page: PageNav::from(&page),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering profile template : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Html(body))
}
