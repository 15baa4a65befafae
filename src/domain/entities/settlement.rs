use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Basis points in a whole amount.
pub const BPS_SCALE: i64 = 10_000;

/// Provider share of captured revenue unless configured otherwise (60%).
pub const DEFAULT_PROVIDER_SHARE_BPS: i64 = 6_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "settlement_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Paid,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Paid => "paid",
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a captured amount is divided between a provider and the platform.
///
/// `provider_share + platform_share == total_amount` always holds: the
/// provider share is rounded half-up and the platform takes the remainder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueSplit {
    pub provider_id: String,
    pub total_amount: i64,
    pub provider_share: i64,
    pub platform_share: i64,
}

impl RevenueSplit {
    pub fn compute(provider_id: impl Into<String>, total_amount: i64, provider_bps: i64) -> Self {
        let bps = provider_bps.clamp(0, BPS_SCALE);
        let provider_share = (total_amount * bps + BPS_SCALE / 2) / BPS_SCALE;
        Self {
            provider_id: provider_id.into(),
            total_amount,
            provider_share,
            platform_share: total_amount - provider_share,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub id: Uuid,
    pub transaction_id: String,
    pub provider_id: String,
    pub total_amount: i64,
    pub provider_share: i64,
    pub platform_share: i64,
    pub status: SettlementStatus,
    pub created_at: Option<NaiveDateTime>,
}
