use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::pdfs::{NewPdf, PdfUpdate, UserPdf};
use crate::repositories::PdfStore;

#[derive(Clone)]
pub struct PdfRepository {
    conn: PgPool,
}

impl PdfRepository {
    pub fn new(conn: PgPool) -> Self {
        PdfRepository { conn }
    }
}

#[async_trait]
impl PdfStore for PdfRepository {
    async fn list_pdfs(&self, user_id: &str) -> Result<Vec<UserPdf>, anyhow::Error> {
        let pdfs = sqlx::query_as::<_, UserPdf>(
            r#"
            SELECT id, user_id, filename, storage_path, last_page, annotations, uploaded_at
            FROM user_pdfs WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(pdfs)
    }

    async fn insert_pdf(&self, user_id: &str, pdf: NewPdf) -> Result<UserPdf, anyhow::Error> {
        let pdf_id = Uuid::new_v4().hyphenated().to_string();
        let inserted = sqlx::query_as::<_, UserPdf>(
            r#"
            INSERT INTO user_pdfs (id, user_id, filename, storage_path, last_page, annotations)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, filename, storage_path, last_page, annotations, uploaded_at
            "#,
        )
        .bind(pdf_id)
        .bind(user_id)
        .bind(&pdf.filename)
        .bind(&pdf.storage_path)
        .bind(pdf.last_page)
        .bind(&pdf.annotations)
        .fetch_one(&self.conn)
        .await?;

        Ok(inserted)
    }

    async fn update_pdf(
        &self,
        user_id: &str,
        pdf_id: &str,
        update: PdfUpdate,
    ) -> Result<(), anyhow::Error> {
        sqlx::query(
            r#"
            UPDATE user_pdfs
            SET last_page = COALESCE($3, last_page),
                annotations = COALESCE($4, annotations)
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(pdf_id)
        .bind(user_id)
        .bind(update.last_page)
        .bind(&update.annotations)
        .execute(&self.conn)
        .await?;

        Ok(())
    }
}
