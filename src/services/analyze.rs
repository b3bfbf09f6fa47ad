use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use crate::models::analysis::AnalysisResult;
use crate::models::profiles::UserProfile;
use crate::repositories::{EtymologyProvider, HistoryStore, ProfileStore};

use super::quota::QuotaManager;
use super::{RequestHandler, Service, ServiceError};

pub enum AnalyzeRequest {
    Analyze {
        user_id: String,
        email: String,
        word: String,
        response: oneshot::Sender<Result<AnalysisResult, ServiceError>>,
    },
}

/// Runs the lookup pipeline for one word: admit against the quota, call the
/// upstream, commit usage, append history. Strictly sequential per request;
/// requests never wait on each other.
#[derive(Clone)]
pub struct AnalyzeRequestHandler {
    profiles: Arc<dyn ProfileStore>,
    etymology: Arc<dyn EtymologyProvider>,
    history: Arc<dyn HistoryStore>,
    quota: QuotaManager,
}

impl AnalyzeRequestHandler {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        etymology: Arc<dyn EtymologyProvider>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let quota = QuotaManager::new(Arc::clone(&profiles));

        AnalyzeRequestHandler {
            profiles,
            etymology,
            history,
            quota,
        }
    }

    async fn get_or_create_profile(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<UserProfile, ServiceError> {
        // Admission cannot be evaluated without a profile, so a store
        // failure here fails the whole request.
        let profile = self
            .profiles
            .get_profile(user_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        match profile {
            Some(profile) => Ok(profile),
            None => self
                .profiles
                .create_default_profile(user_id, email)
                .await
                .map_err(|e| ServiceError::Database(e.to_string())),
        }
    }

    async fn analyze(
        &self,
        user_id: &str,
        email: &str,
        word: &str,
    ) -> Result<AnalysisResult, ServiceError> {
        let profile = self.get_or_create_profile(user_id, email).await?;

        let decision = QuotaManager::check_admission(&profile, Utc::now());
        if !decision.allowed {
            return Err(ServiceError::QuotaExceeded {
                current_usage: decision.current_usage,
                limit: decision.limit,
            });
        }

        // Quota is only consumed on success; a failed upstream call must not
        // count against the user, so the fetch happens before any commit.
        let result = self.etymology.fetch(word).await?;

        // Accounting failure is an operator problem, not a user problem: the
        // analysis is already paid for upstream, so the result still goes out.
        if let Err(e) = self.quota.commit_usage(user_id).await {
            log::error!("usage commit failed for user {user_id}: {e}");
        }

        let history = Arc::clone(&self.history);
        let history_user = user_id.to_string();
        let history_word = word.to_string();
        tokio::spawn(async move {
            if let Err(e) = history.append(&history_user, &history_word).await {
                log::warn!("history append failed for user {history_user}: {e}");
            }
        });

        Ok(result)
    }
}

#[async_trait]
impl RequestHandler<AnalyzeRequest> for AnalyzeRequestHandler {
    async fn handle_request(&self, request: AnalyzeRequest) {
        match request {
            AnalyzeRequest::Analyze {
                user_id,
                email,
                word,
                response,
            } => {
                let result = self.analyze(&user_id, &email, &word).await;
                let _ = response.send(result);
            }
        }
    }
}

pub struct AnalyzeService;

impl AnalyzeService {
    pub fn new() -> Self {
        AnalyzeService {}
    }
}

#[async_trait]
impl Service<AnalyzeRequest, AnalyzeRequestHandler> for AnalyzeService {}
