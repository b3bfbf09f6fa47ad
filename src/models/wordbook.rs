use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct WordbookEntry {
    pub id: String,
    pub user_id: String,
    pub word: String,
    pub context_sentence: Option<String>,
    pub parsed_data: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewWordbookEntry {
    pub word: String,
    pub context_sentence: Option<String>,
    pub parsed_data: Option<serde_json::Value>,
}
