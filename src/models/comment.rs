use sqlx::prelude::FromRow;
use time::OffsetDateTime;

#[derive(FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub created_at: OffsetDateTime,
    pub author_username: String,
}
