use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::{group::Group, post::Post},
    templates::{GroupListTemplate, PageNav, PostCard},
    utils::{
        app_error::AppError,
        pagination::{PaginationParams, Paginator, POSTS_PER_PAGE},
    },
    AppState,
};

pub async fn group_list_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(slug): Path<String>,
    Query(pagination_params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM groups WHERE slug = $1",
    )
    .bind(&slug)
    .fetch_optional(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching group `{slug}` : {e}");
        AppError::internal_server_error()
    })?
    .ok_or_else(AppError::not_found)?;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE group_id = $1")
        .bind(group.id)
        .fetch_one(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error counting posts of group `{slug}` : {e}");
            AppError::internal_server_error()
        })?;

    let page = Paginator::new(total, POSTS_PER_PAGE).page(pagination_params.page);

    let posts = sqlx::query_as::<_, Post>(
        "SELECT p.id, p.text, p.image, p.created_at, u.username AS author_username, \
         g.title AS group_title, g.slug AS group_slug \
         FROM posts p \
         JOIN users u ON u.id = p.author_id \
         JOIN groups g ON g.id = p.group_id \
         WHERE p.group_id = $1 \
         ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3",
    )
    .bind(group.id)
    .bind(page.limit)
    .bind(page.offset)
    .fetch_all(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching posts of group `{slug}` : {e}");
        AppError::internal_server_error()
    })?;

    let template = GroupListTemplate {
        current_user: auth_user.map(|user| user.username),
        group_title: group.title,
        group_slug: group.slug,
        group_description: group.description,
        posts: posts.into_iter().map(PostCard::from).collect(),
        page: PageNav::from(&page),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering group_list template : {e}");
        AppError::internal_server_error()
    })?;

    Ok(Html(body))
}
