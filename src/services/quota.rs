use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::profiles::{QuotaDecision, UserProfile, FREE_MONTHLY_LIMIT};
use crate::repositories::ProfileStore;

use super::ServiceError;

/// Decides admission against the monthly limit and performs the post-success
/// accounting. Admission and commit are deliberately not one atomic unit:
/// concurrent lookups for the same user may both pass admission before either
/// commits (bounded overshoot), but the commit itself never loses increments.
#[derive(Clone)]
pub struct QuotaManager {
    store: Arc<dyn ProfileStore>,
}

impl QuotaManager {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        QuotaManager { store }
    }

    /// Pure function of the profile snapshot. Effective premium (flag plus
    /// unexpired) is exempt from the limit; everyone else is admitted while
    /// the counter is below it.
    pub fn check_admission(profile: &UserProfile, now: DateTime<Utc>) -> QuotaDecision {
        let current_usage = profile.query_usage_current_month;
        let allowed = profile.effective_premium(now) || current_usage < FREE_MONTHLY_LIMIT;

        QuotaDecision {
            allowed,
            current_usage,
            limit: FREE_MONTHLY_LIMIT,
        }
    }

    /// Records one consumed lookup. Only called after the upstream call has
    /// succeeded; the increment is atomic at the store.
    pub async fn commit_usage(&self, user_id: &str) -> Result<(), ServiceError> {
        self.store
            .increment_usage(user_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }
}
