mod extractors;
mod middleware;
mod models;
mod routes;
mod structs;
mod templates;
mod utils;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, Address, SmtpTransport,
};
use libaes::Cipher;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::middleware::logger::logger;
use crate::routes::add_comment::add_comment_route;
use crate::routes::follow_index::follow_index_route;
use crate::routes::group_list::group_list_route;
use crate::routes::index::index_route;
use crate::routes::login_route::{login_form_route, login_route};
use crate::routes::logout_route::logout_route;
use crate::routes::not_found::not_found_route;
use crate::routes::password_change_route::{
    password_change_done_route, password_change_form_route, password_change_route,
};
use crate::routes::password_reset_route::{
    password_reset_complete_route, password_reset_confirm_form_route,
    password_reset_confirm_route, password_reset_done_route, password_reset_form_route,
    password_reset_route,
};
use crate::routes::post_create::{create_post_form_route, create_post_route};
use crate::routes::post_detail::post_detail_route;
use crate::routes::post_edit::{edit_post_form_route, edit_post_route};
use crate::routes::profile::profile_route;
use crate::routes::profile_follow::{profile_follow_route, profile_unfollow_route};
use crate::routes::signup_route::{signup_form_route, signup_route};
use crate::utils::delete_expired_sessions::delete_expired_sessions;
use crate::utils::page_cache::{PageCache, INDEX_CACHE_TTL};

pub struct AppState {
    pool: PgPool,
    smtp_client: SmtpTransport,
    cipher: Cipher,
    page_cache: PageCache,
    media_root: PathBuf,
    site_url: String,
    email_from: Mailbox,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "yatube=info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("Please set DATABASE_URL");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to the database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let smtp_client = SmtpTransport::relay(
        &std::env::var("EMAIL_SMTP_SERVER").expect("Please set EMAIL_SMTP_SERVER"),
    )
    .expect("Failed to build the SMTP transport")
    .credentials(Credentials::new(
        std::env::var("EMAIL").expect("Please set EMAIL"),
        std::env::var("EMAIL_PASSWORD").expect("Please set EMAIL_PASSWORD"),
    ))
    .build();

    match smtp_client.test_connection() {
        Ok(true) => info!("SMTP connection established"),
        Ok(false) => warn!("SMTP server refused the connection test"),
        Err(e) => warn!("SMTP connection test failed : {e}"),
    }

    let email_from = Mailbox {
        name: Some("Yatube".to_string()),
        email: std::env::var("EMAIL")
            .expect("Please set EMAIL")
            .parse::<Address>()
            .expect("EMAIL is not a valid address"),
    };

    let secret_key = std::env::var("SECRET_KEY").expect("Please set SECRET_KEY");
    if secret_key.len() != 32 {
        panic!("The secret key must be 32 bytes long");
    }

    let media_root =
        PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));

    let app_state = Arc::new(AppState {
        pool: pool.clone(),
        smtp_client,
        cipher: Cipher::new_256(secret_key.as_bytes().try_into().unwrap()),
        page_cache: PageCache::new(INDEX_CACHE_TTL),
        media_root: media_root.clone(),
        site_url: std::env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()),
        email_from,
    });

    let router = Router::new()
        .route("/", get(index_route))
        .route("/group/:slug/", get(group_list_route))
        .route("/profile/:username/", get(profile_route))
        .route("/profile/:username/follow/", get(profile_follow_route))
        .route("/profile/:username/unfollow/", get(profile_unfollow_route))
        .route("/posts/:post_id/", get(post_detail_route))
        .route(
            "/posts/:post_id/edit/",
            get(edit_post_form_route).post(edit_post_route),
        )
        .route("/posts/:post_id/comment/", post(add_comment_route))
        .route(
            "/create/",
            get(create_post_form_route).post(create_post_route),
        )
        .route("/follow/", get(follow_index_route))
        .route("/auth/signup/", get(signup_form_route).post(signup_route))
        .route("/auth/login/", get(login_form_route).post(login_route))
        .route("/auth/logout/", get(logout_route))
        .route(
            "/auth/password_change/",
            get(password_change_form_route).post(password_change_route),
        )
        .route(
            "/auth/password_change/done/",
            get(password_change_done_route),
        )
        .route(
            "/auth/password_reset/",
            get(password_reset_form_route).post(password_reset_route),
        )
        .route("/auth/password_reset/done/", get(password_reset_done_route))
        .route("/auth/reset/done/", get(password_reset_complete_route))
        .route(
            "/auth/reset/:token/",
            get(password_reset_confirm_form_route).post(password_reset_confirm_route),
        )
        .nest_service("/static", ServeDir::new("static"))
        .nest_service("/media", ServeDir::new(&media_root))
        .fallback(not_found_route)
        .layer(axum_middleware::from_fn(logger))
        .with_state(app_state);

    let addr: SocketAddr = std::env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()
        .expect("LISTEN_ADDR is not a valid socket address");

    info!("Listening on {addr}");

    let serve_router =
        axum::Server::bind(&addr).serve(router.into_make_service_with_connect_info::<SocketAddr>());

    tokio::select! {
        _ = delete_expired_sessions(&pool) => {
            warn!("This should never happen");
        },
        result = serve_router => {
            result.expect("Server error");
        }
    }
}
