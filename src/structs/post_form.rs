use axum::extract::Multipart;
use hyper::StatusCode;
use tracing::warn;

use crate::utils::app_error::AppError;

pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// The post create/edit form. Submitted as multipart because of the image
/// field; `group` arrives as the id of the selected option, empty for none.
pub struct PostFormData {
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<UploadedImage>,
}

impl PostFormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut text = String::new();
        let mut group = None;
        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Error reading multipart field : {e}");
            AppError::new(StatusCode::BAD_REQUEST, Some("Invalid form data."))
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "text" => {
                    text = field.text().await.map_err(|e| {
                        warn!("Error reading text field : {e}");
                        AppError::new(StatusCode::BAD_REQUEST, Some("Invalid form data."))
                    })?;
                }
                "group" => {
                    let value = field.text().await.map_err(|e| {
                        warn!("Error reading group field : {e}");
                        AppError::new(StatusCode::BAD_REQUEST, Some("Invalid form data."))
                    })?;
                    group = parse_group_field(&value)?;
                }
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    if file_name.is_empty() {
                        // no file picked, the browser still sends the part
                        continue;
                    }
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(|e| {
                        warn!("Error reading image field : {e}");
                        AppError::new(StatusCode::BAD_REQUEST, Some("Invalid form data."))
                    })?;
                    image = Some(UploadedImage {
                        file_name,
                        content_type,
                        data: data.to_vec(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self { text, group, image })
    }
}

fn parse_group_field(value: &str) -> Result<Option<i64>, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<i64>().map(Some).map_err(|e| {
        warn!("Invalid group id `{value}` : {e}");
        AppError::new(StatusCode::BAD_REQUEST, Some("Invalid group."))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_group_value_means_no_group() {
        assert!(matches!(parse_group_field(""), Ok(None)));
        assert!(matches!(parse_group_field("   "), Ok(None)));
    }

    #[test]
    fn group_value_parses_to_an_id() {
        assert!(matches!(parse_group_field("3"), Ok(Some(3))));
        assert!(matches!(parse_group_field(" 12 "), Ok(Some(12))));
    }

    #[test]
    fn non_numeric_group_is_an_error() {
        assert!(parse_group_field("travel").is_err());
    }
}
