use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lookups per month granted to a non-premium account.
pub const FREE_MONTHLY_LIMIT: i64 = 50;

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub query_usage_current_month: i64,
    pub is_premium: bool,
    pub premium_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Premium status as of `now`. The stored flag alone is stale once the
    /// expiry has passed; admission must only ever consult this accessor.
    pub fn effective_premium(&self, now: DateTime<Utc>) -> bool {
        self.is_premium && self.premium_expiry.map_or(true, |expiry| expiry > now)
    }
}

/// Outcome of the admission check. Transient, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub current_usage: i64,
    pub limit: i64,
}
