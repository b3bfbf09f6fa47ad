use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::wordbook::{NewWordbookEntry, WordbookEntry};
use crate::repositories::WordbookStore;

#[derive(Clone)]
pub struct WordbookRepository {
    conn: PgPool,
}

impl WordbookRepository {
    pub fn new(conn: PgPool) -> Self {
        WordbookRepository { conn }
    }
}

#[async_trait]
impl WordbookStore for WordbookRepository {
    async fn list_entries(&self, user_id: &str) -> Result<Vec<WordbookEntry>, anyhow::Error> {
        let entries = sqlx::query_as::<_, WordbookEntry>(
            r#"
            SELECT id, user_id, word, context_sentence, parsed_data, created_at
            FROM wordbook WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(entries)
    }

    /// Returns `None` when the word is already present for this user. Relies
    /// on the unique index over (user_id, word) so that concurrent adds of
    /// the same word cannot both insert.
    async fn insert_entry(
        &self,
        user_id: &str,
        entry: NewWordbookEntry,
    ) -> Result<Option<WordbookEntry>, anyhow::Error> {
        let entry_id = Uuid::new_v4().hyphenated().to_string();
        let inserted = sqlx::query_as::<_, WordbookEntry>(
            r#"
            INSERT INTO wordbook (id, user_id, word, context_sentence, parsed_data)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, word) DO NOTHING
            RETURNING id, user_id, word, context_sentence, parsed_data, created_at
            "#,
        )
        .bind(entry_id)
        .bind(user_id)
        .bind(&entry.word)
        .bind(&entry.context_sentence)
        .bind(&entry.parsed_data)
        .fetch_optional(&self.conn)
        .await?;

        Ok(inserted)
    }

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), anyhow::Error> {
        sqlx::query("DELETE FROM wordbook WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.conn)
            .await?;

        Ok(())
    }
}
