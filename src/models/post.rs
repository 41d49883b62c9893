use std::fmt;

use sqlx::prelude::FromRow;
use time::OffsetDateTime;

/// A post's short string form keeps this many characters of its text.
pub const POST_STR_LENGTH: usize = 15;

/// One post as shown in listings and on the detail page, with its author and
/// optional group resolved.
#[derive(FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
    pub author_username: String,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.text.chars().take(POST_STR_LENGTH) {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// The fields the edit form needs, plus the author for the ownership check.
#[derive(FromRow)]
pub struct EditablePost {
    pub id: i64,
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn post_with_text(text: &str) -> Post {
        Post {
            id: 1,
            text: text.to_string(),
            image: None,
            created_at: datetime!(2023-03-05 22:19 UTC),
            author_username: "NoName".to_string(),
            group_title: None,
            group_slug: None,
        }
    }

    #[test]
    fn post_displays_as_its_first_15_characters() {
        let post = post_with_text("A long enough post text for truncation");
        assert_eq!(post.to_string(), "A long enough p");
    }

    #[test]
    fn short_text_is_kept_whole() {
        let post = post_with_text("Short");
        assert_eq!(post.to_string(), "Short");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let post = post_with_text("Тестовый пост длинный для проверки");
        assert_eq!(post.to_string(), "Тестовый пост д");
    }
}
