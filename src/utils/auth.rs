use axum::response::Response;
use email_address::EmailAddress;
use hyper::StatusCode;
use rand::RngCore;
use sha2::{Digest, Sha512};
use time::Duration;
use tracing::warn;

use crate::structs::signup_form::SignupForm;
use crate::utils::app_error::AppError;
use crate::utils::redirect::redirect_found;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL: Duration = Duration::days(14);

/// Hash a password as `salt$digest`, with a fresh random salt per call.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex_encode(&salt);
    let digest = digest_password(&salt, password);
    format!("{salt}${digest}")
}

/// Check a password against a stored `salt$digest` value.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        warn!("Stored password hash has no salt separator");
        return false;
    };
    digest_password(salt, password) == digest
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Opaque token stored in the `session` cookie and the sessions table.
pub fn new_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Where anonymous users land when they hit a protected route.
pub fn login_redirect_url(next: &str) -> String {
    format!("/auth/login/?next={}", urlencoding::encode(next))
}

pub fn redirect_to_login(next: &str) -> Response {
    redirect_found(&login_redirect_url(next))
}

/// `next` comes from the query string; only site-local paths are honored.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    }
}

pub fn check_username(username: &str) -> Result<(), AppError> {
    let length = username.chars().count();
    if !(3..=30).contains(&length) {
        warn!("Wrong username size : {username}");
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("The username must contain between 3 and 30 characters."),
        ));
    }

    for (i, c) in username.char_indices() {
        if i == 0 {
            if !c.is_alphabetic() {
                warn!("The username has to begin with a letter : {username}");
                return Err(AppError::new(
                    StatusCode::FORBIDDEN,
                    Some("The username must begin with a letter."),
                ));
            }
            continue;
        }
        if !c.is_alphanumeric() && c != '_' {
            warn!("The username has to contain only letters, digits and underscores : {username}");
            return Err(AppError::new(
                StatusCode::FORBIDDEN,
                Some("The username may only contain letters, digits and underscores."),
            ));
        }
    }

    Ok(())
}

pub fn check_email_address(email: &str) -> Result<(), AppError> {
    if !EmailAddress::is_valid(email) {
        warn!("Invalid email `{email}`");
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("The email address is not valid."),
        ));
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        warn!("Password too short");
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("The password must contain at least 8 characters."),
        ));
    }
    Ok(())
}

pub fn check_signup_infos(user: &SignupForm) -> Result<(), AppError> {
    check_username(&user.username)?;

    check_email_address(&user.email)?;

    check_password(&user.password1)?;

    if user.password1 != user.password2 {
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("The two password fields do not match."),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let stored = hash_password("correct horse");
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("secret123"), hash_password("secret123"));
    }

    #[test]
    fn stored_value_without_salt_is_rejected() {
        assert!(!verify_password("secret123", "deadbeef"));
    }

    #[test]
    fn session_tokens_are_64_hex_chars() {
        let token = new_session_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, new_session_token());
    }

    #[test]
    fn login_redirect_encodes_the_path() {
        assert_eq!(
            login_redirect_url("/create/"),
            "/auth/login/?next=%2Fcreate%2F"
        );
        assert_eq!(
            login_redirect_url("/posts/1/edit/"),
            "/auth/login/?next=%2Fposts%2F1%2Fedit%2F"
        );
    }

    #[test]
    fn next_must_be_a_local_path() {
        assert_eq!(safe_next(Some("/follow/")), "/follow/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn username_rules() {
        assert!(check_username("leo_tolstoy").is_ok());
        assert!(check_username("ab").is_err());
        assert!(check_username("1abc").is_err());
        assert!(check_username("bad name").is_err());
    }

    #[test]
    fn signup_infos_password_mismatch() {
        let form = SignupForm {
            username: "author".to_string(),
            email: "author@example.com".to_string(),
            password1: "password123".to_string(),
            password2: "password124".to_string(),
        };
        assert!(check_signup_infos(&form).is_err());
    }
}
