use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::{
    app_error::AppResult,
    domain::entities::{
        payment::Payment,
        payment_status::PaymentStatus,
        settlement::RevenueSplit,
        subscription::{Subscription, UserEntitlement},
    },
};

// ============================================================================
// Constants
// ============================================================================

pub const TRANSACTION_ID_PREFIX: &str = "M360";

/// Payment method recorded when the gateway does not report one.
pub const DEFAULT_PAYMENT_METHOD: &str = "UPI";

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait PaymentRepoTrait: Send + Sync {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<Payment>;

    async fn get_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>>;

    /// `INITIATED -> PENDING`. Returns false when the payment had already moved on.
    async fn mark_pending(
        &self,
        transaction_id: &str,
        gateway_reference: Option<&str>,
    ) -> AppResult<bool>;

    /// Non-terminal -> `FAILED`. Returns false when the payment was already terminal.
    async fn mark_failed(&self, transaction_id: &str, error_code: &str) -> AppResult<bool>;

    /// Applies every write of a successful settlement as one atomic unit,
    /// re-checking the payment status under a row lock first.
    async fn apply_success(&self, transition: &SuccessTransition) -> AppResult<TransitionResult>;
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    pub transaction_id: String,
    pub user_id: String,
    pub plan_id: String,
    pub amount: i64,
    pub source_context: String,
    pub provider_id: Option<String>,
    pub track_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// All rows written when a payment succeeds.
#[derive(Debug, Clone)]
pub struct SuccessTransition {
    pub transaction_id: String,
    pub user_id: String,
    pub gateway_payment_id: Option<String>,
    pub payment_method: String,
    pub settled_at: NaiveDateTime,
    pub subscription: Subscription,
    pub entitlement: UserEntitlement,
    pub split: Option<RevenueSplit>,
    pub audit_details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    Applied,
    /// Another writer got there first; nothing was written.
    AlreadyFinal(PaymentStatus),
    NotFound,
}

/// Status as reported to callers. `INITIATED` is reported as `PENDING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportedStatus {
    Success,
    Failed,
    Pending,
}

impl From<PaymentStatus> for ReportedStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Success => ReportedStatus::Success,
            PaymentStatus::Failed => ReportedStatus::Failed,
            PaymentStatus::Initiated | PaymentStatus::Pending => ReportedStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    pub transaction_id: String,
    pub status: ReportedStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_end: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentResult {
    /// Result derived purely from stored state, without asking the gateway.
    pub fn from_payment(payment: &Payment) -> Self {
        let status = ReportedStatus::from(payment.status);
        Self {
            transaction_id: payment.transaction_id.clone(),
            status,
            subscription_end: payment.subscription_end(),
            payment_method: payment.payment_method.clone(),
            error: match status {
                ReportedStatus::Failed => payment.error_code.clone(),
                _ => None,
            },
        }
    }

    pub fn pending(transaction_id: &str) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            status: ReportedStatus::Pending,
            subscription_end: None,
            payment_method: None,
            error: None,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `M360_<unix millis>_<16 hex chars>`. 64 random bits per millisecond keep
/// collisions negligible; the unique index turns any collision into an error.
pub fn generate_transaction_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!(
        "{}_{}_{}",
        TRANSACTION_ID_PREFIX,
        Utc::now().timestamp_millis(),
        hex::encode(bytes)
    )
}
