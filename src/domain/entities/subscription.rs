use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

/// One row per user; a newer successful payment replaces the previous terms.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub user_id: String,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub payment_transaction_id: String,
    pub auto_renew: bool,
}

/// Entitlement tier granted to a user by a successful payment.
pub const PREMIUM_TIER: &str = "premium";

#[derive(Debug, Clone, Serialize)]
pub struct UserEntitlement {
    pub user_id: String,
    pub tier: String,
    pub status: SubscriptionStatus,
    pub premium_ends_at: NaiveDateTime,
}
