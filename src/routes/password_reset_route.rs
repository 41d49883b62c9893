use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use lettre::Address;
use time::Duration;
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    structs::password_forms::{PasswordResetConfirmForm, PasswordResetForm},
    templates::{
        PasswordResetCompleteTemplate, PasswordResetConfirmTemplate, PasswordResetDoneTemplate,
        PasswordResetTemplate,
    },
    utils::{
        app_error::AppError,
        auth::{check_email_address, check_password, hash_password},
        email::send_html_message,
        redirect::redirect_found,
        token::Token,
    },
    AppState,
};

/// Reset links stay valid this long.
const RESET_TOKEN_TTL: Duration = Duration::hours(1);

fn render<T: Template>(template: &T, context: &str) -> Result<Html<String>, AppError> {
    let body = template.render().map_err(|e| {
        warn!("Error rendering {context} template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body))
}

pub async fn password_reset_form_route(
    AuthUser(auth_user): AuthUser,
) -> Result<Html<String>, AppError> {
    render(
        &PasswordResetTemplate {
            current_user: auth_user.map(|user| user.username),
            error: None,
        },
        "password_reset",
    )
}

pub async fn password_reset_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Form(form): Form<PasswordResetForm>,
) -> Result<Response, AppError> {
    let email = form.email.to_lowercase();
    let current_user = auth_user.map(|user| user.username);

    if check_email_address(&email).is_err() {
        return Ok(render(
            &PasswordResetTemplate {
                current_user,
                error: Some("The email address is not valid.".to_string()),
            },
            "password_reset",
        )?
        .into_response());
    }

    let known = match sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&app_state.pool)
        .await
    {
        Ok(known) => known.is_some(),
        Err(e) => {
            warn!("Error looking up email for password reset : {e}");
            return Err(AppError::internal_server_error());
        }
    };

    // unknown addresses land on the same page so the form cannot be used to
    // probe which emails have accounts
    if known {
        let address = match email.parse::<Address>() {
            Ok(address) => address,
            Err(e) => {
                warn!("Cannot parse email : {e}");
                return Err(AppError::internal_server_error());
            }
        };

        let reset_token = Token::create(email.clone(), RESET_TOKEN_TTL, &app_state.cipher);
        send_html_message(
            &app_state.smtp_client,
            &app_state.email_from,
            "Password reset on Yatube",
            &format!(
                "<p>You asked to reset your Yatube password. \
                 Click <a href='{}/auth/reset/{}/'>here</a> to choose a new one. \
                 If this wasn't you, you can ignore this email.</p>",
                app_state.site_url, reset_token
            ),
            address,
        )?;
    }

    Ok(redirect_found("/auth/password_reset/done/"))
}

pub async fn password_reset_done_route(
    AuthUser(auth_user): AuthUser,
) -> Result<Html<String>, AppError> {
    render(
        &PasswordResetDoneTemplate {
            current_user: auth_user.map(|user| user.username),
        },
        "password_reset_done",
    )
}

pub async fn password_reset_confirm_form_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(token): Path<String>,
) -> Result<Html<String>, AppError> {
    let valid_link = Token::decode(&token, &app_state.cipher).is_ok();
    render(
        &PasswordResetConfirmTemplate {
            current_user: auth_user.map(|user| user.username),
            token,
            valid_link,
            error: None,
        },
        "password_reset_confirm",
    )
}

pub async fn password_reset_confirm_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(token): Path<String>,
    Form(form): Form<PasswordResetConfirmForm>,
) -> Result<Response, AppError> {
    let current_user = auth_user.map(|user| user.username);

    let email = match Token::decode(&token, &app_state.cipher) {
        Ok(email) => email,
        Err(_) => {
            return Ok(render(
                &PasswordResetConfirmTemplate {
                    current_user,
                    token,
                    valid_link: false,
                    error: None,
                },
                "password_reset_confirm",
            )?
            .into_response());
        }
    };

    let invalid_form = |message: String| PasswordResetConfirmTemplate {
        current_user: current_user.clone(),
        token: token.clone(),
        valid_link: true,
        error: Some(message),
    };

    if let Err(e) = check_password(&form.new_password1) {
        let message = e.message().unwrap_or("Invalid password.").to_string();
        return Ok(render(&invalid_form(message), "password_reset_confirm")?.into_response());
    }

    if form.new_password1 != form.new_password2 {
        return Ok(render(
            &invalid_form("The two password fields do not match.".to_string()),
            "password_reset_confirm",
        )?
        .into_response());
    }

    let password = hash_password(&form.new_password1);
    let user_id = match sqlx::query_scalar::<_, i64>(
        "UPDATE users SET password = $1 WHERE email = $2 RETURNING id",
    )
    .bind(&password)
    .bind(&email)
    .fetch_optional(&app_state.pool)
    .await
    {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            warn!("Password reset token for a deleted account");
            return Err(AppError::not_found());
        }
        Err(e) => {
            warn!("Error resetting password : {e}");
            return Err(AppError::internal_server_error());
        }
    };

    // a changed password logs the account out everywhere
    if let Err(e) = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error dropping sessions of user {user_id} : {e}");
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found("/auth/reset/done/"))
}

pub async fn password_reset_complete_route(
    AuthUser(auth_user): AuthUser,
) -> Result<Html<String>, AppError> {
    render(
        &PasswordResetCompleteTemplate {
            current_user: auth_user.map(|user| user.username),
        },
        "password_reset_complete",
    )
}
