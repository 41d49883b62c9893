use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    structs::signup_form::SignupForm,
    templates::SignupTemplate,
    utils::{
        app_error::AppError,
        auth::{check_signup_infos, hash_password},
        redirect::redirect_found,
    },
    AppState,
};

fn render_signup(template: &SignupTemplate) -> Result<Html<String>, AppError> {
    let body = template.render().map_err(|e| {
        warn!("Error rendering signup template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body))
}

pub async fn signup_form_route(AuthUser(auth_user): AuthUser) -> Result<Html<String>, AppError> {
    render_signup(&SignupTemplate {
        current_user: auth_user.map(|user| user.username),
        error: None,
        username: String::new(),
        email: String::new(),
    })
}

pub async fn signup_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Form(mut signup_user): Form<SignupForm>,
) -> Result<Response, AppError> {
    signup_user.username = signup_user.username.to_lowercase();
    signup_user.email = signup_user.email.to_lowercase();

    let current_user = auth_user.map(|user| user.username);
    let invalid_form = |message: String| SignupTemplate {
        current_user: current_user.clone(),
        error: Some(message),
        username: signup_user.username.clone(),
        email: signup_user.email.clone(),
    };

    if let Err(e) = check_signup_infos(&signup_user) {
        let message = e.message().unwrap_or("Invalid form data.").to_string();
        return Ok(render_signup(&invalid_form(message))?.into_response());
    }

    // Check if username is already used
    match sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
        .bind(&signup_user.username)
        .fetch_optional(&app_state.pool)
        .await
    {
        Ok(Some(_)) => {
            warn!("Username `{}` already used", signup_user.username);
            return Ok(
                render_signup(&invalid_form("This username is already taken.".to_string()))?
                    .into_response(),
            );
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Error while checking if username already exists : {e}");
            return Err(AppError::internal_server_error());
        }
    }

    // Check if email is already used
    match sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&signup_user.email)
        .fetch_optional(&app_state.pool)
        .await
    {
        Ok(Some(_)) => {
            warn!("Email address `{}` already used", signup_user.email);
            return Ok(render_signup(&invalid_form(
                "An account with this email address already exists.".to_string(),
            ))?
            .into_response());
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Error while checking if email address already exists : {e}");
            return Err(AppError::internal_server_error());
        }
    }

    let password = hash_password(&signup_user.password1);

    if let Err(e) = sqlx::query("INSERT INTO users (username, email, password) VALUES ($1, $2, $3)")
        .bind(&signup_user.username)
        .bind(&signup_user.email)
        .bind(&password)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error creating account : {e}");
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found("/"))
}
