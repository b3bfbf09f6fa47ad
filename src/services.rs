use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::repositories::etymology::{EtymologyError, GeminiClient};
use crate::repositories::history::HistoryRepository;
use crate::repositories::identity::IdentityClient;
use crate::repositories::pdfs::PdfRepository;
use crate::repositories::profiles::ProfileRepository;
use crate::repositories::wordbook::WordbookRepository;
use crate::settings::Settings;

pub mod analyze;
pub mod http;
pub mod pdfs;
pub mod quota;
pub mod users;
pub mod wordbook;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("monthly free quota exceeded: {current_usage}/{limit}")]
    QuotaExceeded { current_usage: i64, limit: i64 },
    #[error("analysis upstream failed: {0}")]
    Upstream(#[from] EtymologyError),
    #[error("word already in wordbook")]
    DuplicateWord,
    #[error("PDF management is a premium feature")]
    PremiumRequired,
    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let gemini = GeminiClient::new(
        settings.gemini.url,
        settings.gemini.api_key,
        Duration::from_secs(settings.gemini.timeout_secs),
    )?;
    // Misconfiguration fails the process here instead of the first lookup.
    gemini.validate_credentials()?;

    let profiles = Arc::new(ProfileRepository::new(pool.clone()));
    let history = Arc::new(HistoryRepository::new(pool.clone()));
    let identity = IdentityClient::new(settings.auth.url);

    let (analyze_tx, mut analyze_rx) = mpsc::channel(512);
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (wordbook_tx, mut wordbook_rx) = mpsc::channel(512);
    let (pdf_tx, mut pdf_rx) = mpsc::channel(512);

    let mut analyze_service = analyze::AnalyzeService::new();
    let mut user_service = users::UserService::new();
    let mut wordbook_service = wordbook::WordbookService::new();
    let mut pdf_service = pdfs::PdfService::new();

    log::info!("Starting analyze service.");
    let analyze_profiles = Arc::clone(&profiles);
    let analyze_history = Arc::clone(&history);
    tokio::spawn(async move {
        analyze_service
            .run(
                analyze::AnalyzeRequestHandler::new(
                    analyze_profiles,
                    Arc::new(gemini),
                    analyze_history,
                ),
                &mut analyze_rx,
            )
            .await;
    });

    log::info!("Starting user service.");
    let user_profiles = Arc::clone(&profiles);
    tokio::spawn(async move {
        user_service
            .run(users::UserRequestHandler::new(user_profiles), &mut user_rx)
            .await;
    });

    log::info!("Starting wordbook service.");
    let wordbook_pool = pool.clone();
    tokio::spawn(async move {
        wordbook_service
            .run(
                wordbook::WordbookRequestHandler::new(Arc::new(WordbookRepository::new(
                    wordbook_pool,
                ))),
                &mut wordbook_rx,
            )
            .await;
    });

    log::info!("Starting PDF service.");
    let pdf_profiles = Arc::clone(&profiles);
    let pdf_pool = pool.clone();
    tokio::spawn(async move {
        pdf_service
            .run(
                pdfs::PdfRequestHandler::new(pdf_profiles, Arc::new(PdfRepository::new(pdf_pool))),
                &mut pdf_rx,
            )
            .await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(
        settings.server.listen,
        identity,
        analyze_tx,
        user_tx,
        wordbook_tx,
        pdf_tx,
    )
    .await?;

    Ok(())
}
