use std::time::Duration;

use sqlx::PgPool;
use tracing::{info, warn};

pub async fn delete_expired_sessions(pool: &PgPool) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));
    loop {
        interval.tick().await;
        match sqlx::query("DELETE FROM sessions WHERE expires_at < now()")
            .execute(pool)
            .await
        {
            Ok(result) => info!("Deleted {} expired session.s", result.rows_affected()),
            Err(e) => warn!("Error deleting expired sessions : {e}"),
        }
    }
}
