use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserPdf {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub storage_path: String,
    pub last_page: i32,
    pub annotations: Option<serde_json::Value>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPdf {
    pub filename: String,
    pub storage_path: String,
    #[serde(default = "default_last_page")]
    pub last_page: i32,
    pub annotations: Option<serde_json::Value>,
}

fn default_last_page() -> i32 {
    1
}

/// Partial update of reading progress; absent fields are left untouched.
#[derive(Clone, Debug, Deserialize)]
pub struct PdfUpdate {
    pub last_page: Option<i32>,
    pub annotations: Option<serde_json::Value>,
}

impl PdfUpdate {
    pub fn is_empty(&self) -> bool {
        self.last_page.is_none() && self.annotations.is_none()
    }
}
