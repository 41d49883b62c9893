use axum::response::{IntoResponse, Response};
use hyper::{header, StatusCode};

/// Plain `302 Found`, the status every redirect in the app uses.
pub fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_a_302_with_a_location() {
        let response = redirect_found("/posts/1/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/posts/1/"
        );
    }
}
