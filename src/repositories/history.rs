use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repositories::HistoryStore;

#[derive(Clone)]
pub struct HistoryRepository {
    conn: PgPool,
}

impl HistoryRepository {
    pub fn new(conn: PgPool) -> Self {
        HistoryRepository { conn }
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, user_id: &str, word: &str) -> Result<(), anyhow::Error> {
        let record_id = Uuid::new_v4().hyphenated().to_string();

        sqlx::query(
            r#"
            INSERT INTO search_history (id, user_id, word, created_at)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(record_id)
        .bind(user_id)
        .bind(word)
        .execute(&self.conn)
        .await?;

        Ok(())
    }
}
