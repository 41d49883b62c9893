use base64::{engine::general_purpose, Engine};
use hyper::StatusCode;
use libaes::Cipher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::warn;

use crate::utils::app_error::AppError;

/// Struct that represents a serialized one-time token
#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    exp: i64,
    sub: String,
}

impl Token {
    /// Create an encrypted and encoded token
    pub fn create(sub: String, exp_in: Duration, cipher: &Cipher) -> String {
        // Get expiration timestamp
        let exp = (OffsetDateTime::now_utc() + exp_in).unix_timestamp();

        // Get serialized claims
        let claims = json!(Token { exp, sub }).to_string();

        // Generate nonce
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);

        let plaintext = claims.as_bytes();

        let encrypted = cipher.cbc_encrypt(&nonce, plaintext);
        // Encode data with the nonce at the beginning; the url-safe alphabet
        // lets the token ride in a path segment
        general_purpose::URL_SAFE_NO_PAD.encode([&nonce, encrypted.as_slice()].concat())
    }

    /// Decode a token and return its subject or an error
    pub fn decode(token: &str, cipher: &Cipher) -> Result<String, AppError> {
        let encrypted_decoded = general_purpose::URL_SAFE_NO_PAD.decode(token).map_err(|e| {
            warn!("Error decoding token : {e}");
            AppError::new(StatusCode::FORBIDDEN, Some("Invalid token."))
        })?;
        if encrypted_decoded.len() <= 16 {
            warn!("Token too short : {} bytes", encrypted_decoded.len());
            return Err(AppError::new(StatusCode::FORBIDDEN, Some("Invalid token.")));
        }
        // Split the nonce and the data
        let nonce = &encrypted_decoded[..16];
        let datas = &encrypted_decoded[16..];
        let decrypted = cipher.cbc_decrypt(nonce, datas);
        let string_decrypted = String::from_utf8(decrypted).map_err(|e| {
            warn!("Error decrypting token : {e}");
            AppError::new(StatusCode::FORBIDDEN, Some("Invalid token."))
        })?;

        let token: Token = serde_json::from_str(&string_decrypted).map_err(|e| {
            warn!("Error deserializing token `{string_decrypted}` : {e}");
            AppError::new(StatusCode::FORBIDDEN, Some("Invalid token."))
        })?;
        if token.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            warn!(
                "Expired token {}, expire timestamp : {}",
                token.sub, token.exp
            );
            return Err(AppError::new(StatusCode::FORBIDDEN, Some("Expired token.")));
        }

        Ok(token.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> Cipher {
        Cipher::new_256(&[7u8; 32])
    }

    #[test]
    fn round_trip_returns_the_subject() {
        let cipher = test_cipher();
        let token = Token::create("reader@example.com".to_string(), Duration::hours(1), &cipher);
        assert_eq!(
            Token::decode(&token, &cipher).map_err(|e| e.status()),
            Ok("reader@example.com".to_string())
        );
    }

    #[test]
    fn token_is_path_segment_safe() {
        let cipher = test_cipher();
        let token = Token::create("reader@example.com".to_string(), Duration::hours(1), &cipher);
        assert!(!token.contains('/'));
        assert!(!token.contains('+'));
        assert!(!token.contains('='));
    }

    #[test]
    fn expired_token_is_rejected() {
        let cipher = test_cipher();
        let token = Token::create("reader@example.com".to_string(), Duration::hours(-1), &cipher);
        assert!(Token::decode(&token, &cipher).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let cipher = test_cipher();
        assert!(Token::decode("not-a-token", &cipher).is_err());
        assert!(Token::decode("", &cipher).is_err());
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let token = Token::create(
            "reader@example.com".to_string(),
            Duration::hours(1),
            &test_cipher(),
        );
        let other = Cipher::new_256(&[9u8; 32]);
        assert!(Token::decode(&token, &other).is_err());
    }
}
