pub mod app_error;
pub mod auth;
pub mod delete_expired_sessions;
pub mod email;
pub mod media;
pub mod page_cache;
pub mod pagination;
pub mod redirect;
pub mod token;
