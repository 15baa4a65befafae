use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{plan::Plan, payment_status::PaymentStatus};

#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub transaction_id: String,
    pub user_id: String,
    pub plan_id: String,
    /// Minor currency units.
    pub amount: i64,
    /// Tag identifying the screen that started the purchase.
    pub source_context: String,
    pub provider_id: Option<String>,
    pub track_id: Option<String>,
    pub metadata: serde_json::Value,
    pub status: PaymentStatus,
    /// Reference returned by the gateway when the payment was created.
    pub gateway_reference: Option<String>,
    /// Gateway-side payment id reported once the payment succeeded.
    pub gateway_payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub error_code: Option<String>,
    pub settled_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Payment {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn plan(&self) -> Option<&'static Plan> {
        Plan::find(&self.plan_id)
    }

    /// Subscription end granted by this payment, once it has settled.
    pub fn subscription_end(&self) -> Option<NaiveDateTime> {
        if self.status != PaymentStatus::Success {
            return None;
        }
        let settled_at = self.settled_at?;
        Some(self.plan()?.ends_at_from(settled_at))
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
