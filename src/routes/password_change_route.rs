use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::Uri,
    response::{Html, IntoResponse, Response},
    Form,
};
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    structs::password_forms::PasswordChangeForm,
    templates::{PasswordChangeDoneTemplate, PasswordChangeTemplate},
    utils::{
        app_error::AppError,
        auth::{check_password, hash_password, redirect_to_login, verify_password},
        redirect::redirect_found,
    },
    AppState,
};

fn render_change(template: &PasswordChangeTemplate) -> Result<Html<String>, AppError> {
    let body = template.render().map_err(|e| {
        warn!("Error rendering password_change template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body))
}

pub async fn password_change_form_route(
    AuthUser(auth_user): AuthUser,
    uri: Uri,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };
    Ok(render_change(&PasswordChangeTemplate {
        current_user: Some(auth_user.username),
        error: None,
    })?
    .into_response())
}

pub async fn password_change_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    uri: Uri,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let invalid_form = |message: String| PasswordChangeTemplate {
        current_user: Some(auth_user.username.clone()),
        error: Some(message),
    };

    let stored = match sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
        .bind(auth_user.id)
        .fetch_one(&app_state.pool)
        .await
    {
        Ok(stored) => stored,
        Err(e) => {
            warn!("Error fetching password of user {} : {e}", auth_user.id);
            return Err(AppError::internal_server_error());
        }
    };

    if !verify_password(&form.old_password, &stored) {
        warn!("Wrong current password for user {}", auth_user.id);
        return Ok(render_change(&invalid_form(
            "Your current password was entered incorrectly.".to_string(),
        ))?
        .into_response());
    }

    if let Err(e) = check_password(&form.new_password1) {
        let message = e.message().unwrap_or("Invalid password.").to_string();
        return Ok(render_change(&invalid_form(message))?.into_response());
    }

    if form.new_password1 != form.new_password2 {
        return Ok(render_change(&invalid_form(
            "The two password fields do not match.".to_string(),
        ))?
        .into_response());
    }

    let password = hash_password(&form.new_password1);
    if let Err(e) = sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(&password)
        .bind(auth_user.id)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error updating password of user {} : {e}", auth_user.id);
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found("/auth/password_change/done/"))
}

pub async fn password_change_done_route(
    AuthUser(auth_user): AuthUser,
    uri: Uri,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };
    let template = PasswordChangeDoneTemplate {
        current_user: Some(auth_user.username),
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering password_change_done template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body).into_response())
}
