use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use hyper::StatusCode;
use sqlx::PgPool;
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::group::GroupChoice,
    structs::post_form::PostFormData,
    templates::{GroupOption, PostFormTemplate},
    utils::{app_error::AppError, auth::redirect_to_login, media::save_post_image, redirect::redirect_found},
    AppState,
};

pub(crate) async fn group_options(
    pool: &PgPool,
    selected: Option<i64>,
) -> Result<Vec<GroupOption>, AppError> {
    let groups =
        sqlx::query_as::<_, GroupChoice>("SELECT id, title FROM groups ORDER BY title, id")
            .fetch_all(pool)
            .await
            .map_err(|e| {
                warn!("Error fetching groups for the post form : {e}");
                AppError::internal_server_error()
            })?;
    Ok(groups
        .into_iter()
        .map(|group| GroupOption {
            selected: selected == Some(group.id),
            id: group.id,
            title: group.title,
        })
        .collect())
}

fn render_form(template: &PostFormTemplate) -> Result<Html<String>, AppError> {
    let body = template.render().map_err(|e| {
        warn!("Error rendering create_post template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body))
}

pub async fn create_post_form_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    uri: Uri,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let template = PostFormTemplate {
        current_user: Some(auth_user.username),
        is_edit: false,
        action: "/create/".to_string(),
        text: String::new(),
        groups: group_options(&app_state.pool, None).await?,
        error: None,
    };
    Ok(render_form(&template)?.into_response())
}

pub async fn create_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    uri: Uri,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let form = PostFormData::from_multipart(multipart).await?;
    let text = form.text.trim().to_string();

    let app_state_ref = &app_state;
    let auth_user_ref = &auth_user;
    let invalid_form = |message: String, group: Option<i64>, text: String| async move {
        let template = PostFormTemplate {
            current_user: Some(auth_user_ref.username.clone()),
            is_edit: false,
            action: "/create/".to_string(),
            text,
            groups: group_options(&app_state_ref.pool, group).await?,
            error: Some(message),
        };
        Ok::<Response, AppError>(render_form(&template)?.into_response())
    };

    if text.is_empty() {
        return invalid_form(
            "The post text must not be empty.".to_string(),
            form.group,
            text,
        )
        .await;
    }

    let image = match &form.image {
        Some(upload) => {
            match save_post_image(
                &app_state.media_root,
                &upload.file_name,
                upload.content_type.as_deref(),
                &upload.data,
            )
            .await
            {
                Ok(stored) => Some(stored),
                // a rejected upload is a form error, not a failed response
                Err(e) if e.status() == StatusCode::FORBIDDEN => {
                    let message = e.message().unwrap_or("Invalid image.").to_string();
                    return invalid_form(message, form.group, text).await;
                }
                Err(e) => return Err(e),
            }
        }
        None => None,
    };

    if let Err(e) = sqlx::query("INSERT INTO posts (author_id, group_id, text, image) VALUES ($1, $2, $3, $4)")
        .bind(auth_user.id)
        .bind(form.group)
        .bind(&text)
        .bind(&image)
        .execute(&app_state.pool)
        .await
    {
        warn!("Error inserting post with author {} : {e}", auth_user.id);
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found(&format!("/profile/{}/", auth_user.username)))
}
