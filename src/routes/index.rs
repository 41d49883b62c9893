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
    templates::{IndexTemplate, PageNav, PostCard},
    utils::{
        app_error::AppError,
        pagination::{PaginationParams, Paginator, POSTS_PER_PAGE},
    },
    AppState,
};

pub async fn index_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    uri: Uri,
    Query(pagination_params): Query<PaginationParams>,
) -> Result<Response, AppError> {
    // the cache key is the path+query and nothing else; a cached body is
    // served as-is regardless of who asks
    let cache_key = uri.to_string();
    if let Some(body) = app_state.page_cache.get(&cache_key) {
        return Ok(Html(body).into_response());
    }

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error counting posts : {e}");
            AppError::internal_server_error()
        })?;

    let page = Paginator::new(total, POSTS_PER_PAGE).page(pagination_params.page);

    let posts = sqlx::query_as::<_, Post>(
        "SELECT p.id, p.text, p.image, p.created_at, u.username AS author_username, \
         g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         JOIN users u ON u.id = p.author_id \
         LEFT JOIN groups g ON g.id = p.group_id \
         ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2",
    )
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching posts for the index page : {e}");
        AppError::internal_server_error()
    })?;

    let template = IndexTemplate {
        current_user: auth_user.map(|user| user.username),
        posts: posts.into_iter().map(PostCard::from).collect(),
        page: PageNav::from(&page),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering index template : {e}");
        AppError::internal_server_error()
    })?;

    app_state.page_cache.put(cache_key, body.clone());

    Ok(Html(body).into_response())
}
