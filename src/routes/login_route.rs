use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::user::User,
    structs::login_form::{LoginForm, NextParams},
    templates::LoginTemplate,
    utils::{
        app_error::AppError,
        auth::{new_session_token, safe_next, verify_password, SESSION_COOKIE, SESSION_TTL},
        redirect::redirect_found,
    },
    AppState,
};

fn render_login(template: &LoginTemplate) -> Result<Html<String>, AppError> {
    let body = template.render().map_err(|e| {
        warn!("Error rendering login template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body))
}

pub async fn login_form_route(
    AuthUser(auth_user): AuthUser,
    Query(params): Query<NextParams>,
) -> Result<Html<String>, AppError> {
    render_login(&LoginTemplate {
        current_user: auth_user.map(|user| user.username),
        error: None,
        next: params.next.unwrap_or_default(),
    })
}

pub async fn login_route(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(login_user): Form<LoginForm>,
) -> Result<Response, AppError> {
    let username = login_user.username.to_lowercase();
    let next = login_user.next.unwrap_or_default();

    let invalid_credentials = || LoginTemplate {
        current_user: None,
        error: Some("Invalid credentials.".to_string()),
        next: next.clone(),
    };

    let user = match sqlx::query_as::<_, User>(
        "SELECT id, username, email, password, created_at FROM users WHERE username = $1",
    )
    .bind(&username)
    .fetch_optional(&app_state.pool)
    .await
    {
        Ok(user) => user,
        Err(e) => {
            warn!("Error getting user @{username} from database : {e}");
            return Err(AppError::internal_server_error());
        }
    };

    let Some(user) = user else {
        warn!("Login attempt for unknown user @{username}");
        return Ok(render_login(&invalid_credentials())?.into_response());
    };

    if !verify_password(&login_user.password, &user.password) {
        warn!("Wrong password for user @{username}");
        return Ok(render_login(&invalid_credentials())?.into_response());
    }

    let token = new_session_token();
    if let Err(e) = sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user.id)
        .bind(OffsetDateTime::now_utc() + SESSION_TTL)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error creating session for user @{username} : {e}");
        return Err(AppError::internal_server_error());
    }

    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    Ok((jar.add(cookie), redirect_found(safe_next(Some(&next)))).into_response())
}
