use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::Uri,
    response::Response,
};
use tracing::{info, warn};

use crate::{
    extractors::auth_extractor::AuthUser,
    utils::{app_error::AppError, auth::redirect_to_login, redirect::redirect_found},
    AppState,
};

async fn author_id_by_username(app_state: &AppState, username: &str) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(&app_state.pool)
        .await
        .map_err(|e| {
            warn!("Error fetching user `{username}` : {e}");
            AppError::internal_server_error()
        })?
        .ok_or_else(AppError::not_found)
}

pub async fn profile_follow_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let author_id = author_id_by_username(&app_state, &username).await?;

    // following yourself is a no-op; following twice must not duplicate the edge
    if author_id != auth_user.id {
        if let Err(e) = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) \
             ON CONFLICT (follower_id, followed_id) DO NOTHING",
        )
        .bind(auth_user.id)
        .bind(author_id)
        .execute(&app_state.pool)
        .await
        {
            warn!("Error following `{username}` by {} : {e}", auth_user.id);
            return Err(AppError::internal_server_error());
        }
        info!("User {} now follows `{username}`", auth_user.username);
    }

    Ok(redirect_found(&format!("/profile/{username}/")))
}

pub async fn profile_unfollow_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(username): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let author_id = author_id_by_username(&app_state, &username).await?;

    if let Err(e) = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
        .bind(auth_user.id)
        .bind(author_id)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error unfollowing `{username}` by {} : {e}", auth_user.id);
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found(&format!("/profile/{username}/")))
}
