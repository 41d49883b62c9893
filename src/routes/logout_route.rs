use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::warn;

use crate::{
    templates::LoggedOutTemplate,
    utils::{app_error::AppError, auth::SESSION_COOKIE},
    AppState,
};

pub async fn logout_route(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let jar = match jar.get(SESSION_COOKIE) {
        Some(cookie) => {
            if let Err(e) = sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(cookie.value())
                .execute(&app_state.pool)
                .await
            {
                warn!("Error deleting session : {e}");
                return Err(AppError::internal_server_error());
            }
            let mut removal = Cookie::named(SESSION_COOKIE);
            removal.set_path("/");
            jar.remove(removal)
        }
        None => jar,
    };

    let template = LoggedOutTemplate { current_user: None };
    let body = template.render().map_err(|e| {
        warn!("Error rendering logged_out template : {e}");
        AppError::internal_server_error()
    })?;

    Ok((jar, Html(body)).into_response())
}
