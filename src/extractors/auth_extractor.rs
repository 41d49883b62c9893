use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use sqlx::prelude::FromRow;
use tracing::warn;

use crate::{
    utils::{app_error::AppError, auth::SESSION_COOKIE},
    AppState,
};

#[derive(FromRow, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

/// The requester, if the `session` cookie resolves to a live session. Routes
/// decide for themselves what `None` means (public page vs login redirect).
pub struct AuthUser(pub Option<CurrentUser>);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let cookies = CookieJar::from_request_parts(parts, state).await.unwrap();
        let token = match cookies.get(SESSION_COOKIE) {
            Some(cookie) => cookie.value().to_string(),
            None => return Ok(AuthUser(None)),
        };
        match sqlx::query_as::<_, CurrentUser>(
            "SELECT u.id, u.username FROM users u \
             JOIN sessions s ON s.user_id = u.id \
             WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(&token)
        .fetch_optional(&app_state.pool)
        .await
        {
            Ok(user) => Ok(AuthUser(user)),
            Err(e) => {
                warn!("Error getting auth user from database : {e}");
                Err(AppError::internal_server_error())
            }
        }
    }
}
