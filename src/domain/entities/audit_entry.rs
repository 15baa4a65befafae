use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

pub const ACTION_PAYMENT_SUCCESS: &str = "payment_success";

/// Append-only record written once per successful settlement.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: String,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: NaiveDateTime,
}
