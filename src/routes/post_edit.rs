use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    http::Uri,
    response::{Html, IntoResponse, Response},
};
use hyper::StatusCode;
use tracing::warn;

use crate::{
    extractors::auth_extractor::AuthUser,
    models::post::EditablePost,
    routes::post_create::group_options,
    structs::post_form::PostFormData,
    templates::PostFormTemplate,
    utils::{app_error::AppError, auth::redirect_to_login, media::save_post_image, redirect::redirect_found},
    AppState,
};

async fn editable_post(app_state: &AppState, post_id: i64) -> Result<EditablePost, AppError> {
    sqlx::query_as::<_, EditablePost>(
        "SELECT id, author_id, text, group_id FROM posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_optional(&app_state.pool)
    .await
    .map_err(|e| {
        warn!("Error fetching post {post_id} for edit : {e}");
        AppError::internal_server_error()
    })?
    .ok_or_else(AppError::not_found)
}

pub async fn edit_post_form_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<String>,
    uri: Uri,
) -> Result<Response, AppError> {
    let post_id: i64 = post_id.parse().map_err(|_| AppError::not_found())?;

    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let post = editable_post(&app_state, post_id).await?;
    if post.author_id != auth_user.id {
        // not the author: back to the post, silently
        return Ok(redirect_found(&format!("/posts/{post_id}/")));
    }

    let template = PostFormTemplate {
        current_user: Some(auth_user.username),
        is_edit: true,
        action: format!("/posts/{post_id}/edit/"),
        text: post.text,
        groups: group_options(&app_state.pool, post.group_id).await?,
        error: None,
    };
    let body = template.render().map_err(|e| {
        warn!("Error rendering create_post template : {e}");
        AppError::internal_server_error()
    })?;
    Ok(Html(body).into_response())
}

pub async fn edit_post_route(
    State(app_state): State<Arc<AppState>>,
    AuthUser(auth_user): AuthUser,
    Path(post_id): Path<String>,
    uri: Uri,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let post_id: i64 = post_id.parse().map_err(|_| AppError::not_found())?;

    let Some(auth_user) = auth_user else {
        return Ok(redirect_to_login(uri.path()));
    };

    let post = editable_post(&app_state, post_id).await?;
    if post.author_id != auth_user.id {
        return Ok(redirect_found(&format!("/posts/{post_id}/")));
    }

    let form = PostFormData::from_multipart(multipart).await?;
    let text = form.text.trim().to_string();

    let app_state_ref = &app_state;
    let auth_user_ref = &auth_user;
    let invalid_form = |message: String, group: Option<i64>, text: String| async move {
        let template = PostFormTemplate {
            current_user: Some(auth_user_ref.username.clone()),
            is_edit: true,
            action: format!("/posts/{post_id}/edit/"),
            text,
            groups: group_options(&app_state_ref.pool, group).await?,
            error: Some(message),
        };
        let body = template.render().map_err(|e| {
            warn!("Error rendering create_post template : {e}");
            AppError::internal_server_error()
        })?;
        Ok::<Response, AppError>(Html(body).into_response())
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
                Err(e) if e.status() == StatusCode::FORBIDDEN => {
                    let message = e.message().unwrap_or("Invalid image.").to_string();
                    return invalid_form(message, form.group, text).await;
                }
                Err(e) => return Err(e),
            }
        }
        None => None,
    };

    // the image column is only touched when a new file was uploaded
    let result = match &image {
        Some(image) => {
            sqlx::query("UPDATE posts SET text = $1, group_id = $2, image = $3 WHERE id = $4")
                .bind(&text)
                .bind(form.group)
                .bind(image)
                .bind(post_id)
                .execute(&app_state.pool)
                .await
        }
        None => sqlx::query("UPDATE posts SET text = $1, group_id = $2 WHERE id = $3")
            .bind(&text)
            .bind(form.group)
            .bind(post_id)
            .execute(&app_state.pool)
            .await,
    };
    if let Err(e) = result {
        warn!("Error updating post {post_id} : {e}");
        return Err(AppError::internal_server_error());
    }

    Ok(redirect_found(&format!("/posts/{post_id}/")))
}
