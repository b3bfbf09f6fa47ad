use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::profiles::UserProfile;
use crate::repositories::ProfileStore;

#[derive(Clone)]
pub struct ProfileRepository {
    conn: PgPool,
}

impl ProfileRepository {
    pub fn new(conn: PgPool) -> Self {
        ProfileRepository { conn }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, email, query_usage_current_month, is_premium, premium_expiry, created_at
            FROM profiles WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(profile)
    }

    async fn create_default_profile(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<UserProfile, anyhow::Error> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO profiles (id, email, query_usage_current_month, is_premium)
            VALUES ($1, $2, 0, false)
            ON CONFLICT (id) DO UPDATE SET email = profiles.email
            RETURNING id, email, query_usage_current_month, is_premium, premium_expiry, created_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_one(&self.conn)
        .await?;

        Ok(profile)
    }

    async fn increment_usage(&self, user_id: &str) -> Result<(), anyhow::Error> {
        // Single-statement increment; concurrent commits must never lose
        // updates even when admission overshoots.
        sqlx::query(
            r#"
            UPDATE profiles
            SET query_usage_current_month = query_usage_current_month + 1
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.conn)
        .await?;

        Ok(())
    }
}
