use async_trait::async_trait;

use crate::models::analysis::AnalysisResult;
use crate::models::pdfs::{NewPdf, PdfUpdate, UserPdf};
use crate::models::profiles::UserProfile;
use crate::models::wordbook::{NewWordbookEntry, WordbookEntry};

pub mod etymology;
pub mod history;
pub mod identity;
pub mod pdfs;
pub mod profiles;
pub mod wordbook;

/// Durable per-user profile record. The usage counter is only ever mutated
/// through `increment_usage`, which must be atomic at the store level.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, anyhow::Error>;

    async fn create_default_profile(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<UserProfile, anyhow::Error>;

    /// Adds 1 to the monthly usage counter as a single conditional store
    /// operation, never a read-modify-write of a previously fetched value.
    async fn increment_usage(&self, user_id: &str) -> Result<(), anyhow::Error>;
}

/// External analysis upstream. One attempt per call, no retries here.
#[async_trait]
pub trait EtymologyProvider: Send + Sync + 'static {
    async fn fetch(&self, word: &str) -> Result<AnalysisResult, etymology::EtymologyError>;
}

/// Append-only record of successful lookups. Callers treat failures as
/// observable but non-fatal.
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    async fn append(&self, user_id: &str, word: &str) -> Result<(), anyhow::Error>;
}

/// Per-user saved words. A word appears at most once per user; `insert_entry`
/// returns `None` when it is already present.
#[async_trait]
pub trait WordbookStore: Send + Sync + 'static {
    async fn list_entries(&self, user_id: &str) -> Result<Vec<WordbookEntry>, anyhow::Error>;

    async fn insert_entry(
        &self,
        user_id: &str,
        entry: NewWordbookEntry,
    ) -> Result<Option<WordbookEntry>, anyhow::Error>;

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), anyhow::Error>;
}

/// Per-user registered PDF documents and their reading progress.
#[async_trait]
pub trait PdfStore: Send + Sync + 'static {
    async fn list_pdfs(&self, user_id: &str) -> Result<Vec<UserPdf>, anyhow::Error>;

    async fn insert_pdf(&self, user_id: &str, pdf: NewPdf) -> Result<UserPdf, anyhow::Error>;

    async fn update_pdf(
        &self,
        user_id: &str,
        pdf_id: &str,
        update: PdfUpdate,
    ) -> Result<(), anyhow::Error>;
}
