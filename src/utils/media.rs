use std::path::{Path, PathBuf};

use hyper::StatusCode;
use rand::RngCore;
use tracing::warn;

use crate::utils::app_error::AppError;

/// Subdirectory of the media root where post images land; the relative name
/// (`posts/<file>`) is what the post row stores.
const POSTS_SUBDIR: &str = "posts";

pub async fn save_post_image(
    media_root: &Path,
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<String, AppError> {
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        warn!(
            "Rejected upload `{file_name}` with content type {:?}",
            content_type
        );
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("Only image uploads are accepted."),
        ));
    }

    let file_name = sanitize_file_name(file_name);
    if file_name.is_empty() {
        return Err(AppError::new(
            StatusCode::FORBIDDEN,
            Some("The uploaded file has no usable name."),
        ));
    }

    let dir = media_root.join(POSTS_SUBDIR);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        warn!("Error creating media directory {} : {e}", dir.display());
        AppError::internal_server_error()
    })?;

    let (target, stored_name) = free_target(&dir, &file_name).await;
    tokio::fs::write(&target, data).await.map_err(|e| {
        warn!("Error writing upload to {} : {e}", target.display());
        AppError::internal_server_error()
    })?;

    Ok(format!("{POSTS_SUBDIR}/{stored_name}"))
}

/// Keep only the final path component so uploads cannot escape the media dir.
fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}

/// On a name collision the new file gets a random suffix instead of
/// overwriting the old one.
async fn free_target(dir: &Path, file_name: &str) -> (PathBuf, String) {
    let target = dir.join(file_name);
    if tokio::fs::try_exists(&target).await.ok() != Some(true) {
        return (target, file_name.to_string());
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (file_name, None),
    };
    let mut suffix = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut suffix);
    let suffix: String = suffix.iter().map(|b| format!("{b:02x}")).collect();
    let renamed = match extension {
        Some(extension) => format!("{stem}_{suffix}.{extension}"),
        None => format!("{stem}_{suffix}"),
    };
    (dir.join(&renamed), renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_media_root(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("yatube-media-{tag}-{}", std::process::id()));
        // leftovers from an aborted run would skew the collision checks
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00!\xf9\x04\x01\x0a\x00\x01\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02L\x01\x00;";

    #[tokio::test]
    async fn stores_under_posts_and_returns_relative_name() {
        let root = temp_media_root("store");
        let stored = save_post_image(&root, "small.gif", Some("image/gif"), SMALL_GIF)
            .await
            .unwrap();
        assert_eq!(stored, "posts/small.gif");
        assert_eq!(std::fs::read(root.join(&stored)).unwrap(), SMALL_GIF);
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn non_image_content_type_is_rejected() {
        let root = temp_media_root("reject");
        let result = save_post_image(&root, "notes.txt", Some("text/plain"), b"hello").await;
        assert!(result.is_err());
        let result = save_post_image(&root, "small.gif", None, SMALL_GIF).await;
        assert!(result.is_err());
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn path_components_are_stripped() {
        let root = temp_media_root("traversal");
        let stored = save_post_image(&root, "../../etc/evil.gif", Some("image/gif"), SMALL_GIF)
            .await
            .unwrap();
        assert_eq!(stored, "posts/evil.gif");
        std::fs::remove_dir_all(root).unwrap();
    }

    #[tokio::test]
    async fn collision_gets_a_suffix() {
        let root = temp_media_root("collision");
        let first = save_post_image(&root, "small.gif", Some("image/gif"), SMALL_GIF)
            .await
            .unwrap();
        let second = save_post_image(&root, "small.gif", Some("image/gif"), SMALL_GIF)
            .await
            .unwrap();
        assert_eq!(first, "posts/small.gif");
        assert_ne!(second, first);
        assert!(second.starts_with("posts/small_"));
        assert!(second.ends_with(".gif"));
        std::fs::remove_dir_all(root).unwrap();
    }
}
