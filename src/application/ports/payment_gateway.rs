use async_trait::async_trait;
use serde::Serialize;

use crate::{app_error::AppResult, domain::entities::gateway_outcome::GatewayOutcome};

// ============================================================================
// Port Types
// ============================================================================

/// Everything the gateway needs to open a hosted payment page.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub transaction_id: String,
    pub user_id: String,
    pub amount: i64,
}

/// Result of creating a payment with the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRedirect {
    /// The gateway's own reference for the payment
    pub reference: String,
    /// Hosted payment page the user is sent to
    pub redirect_url: String,
}

/// Status of a transaction as reported by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayStatusReport {
    pub code: String,
    pub outcome: GatewayOutcome,
    /// Gateway-side payment id, present once money moved
    pub gateway_payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub message: Option<String>,
    /// Undecoded response body, kept for logging
    pub raw: serde_json::Value,
}

impl GatewayStatusReport {
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            outcome: GatewayOutcome::from_code(&code),
            code,
            gateway_payment_id: None,
            payment_method: None,
            message: None,
            raw: serde_json::Value::Null,
        }
    }
}

// ============================================================================
// Port Trait
// ============================================================================

/// Outbound calls to the external payment gateway.
///
/// Implementations sign every request and surface network failures and
/// non-2xx responses as `AppError::Gateway`. They never retry.
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_payment(&self, order: &GatewayOrder) -> AppResult<GatewayRedirect>;

    async fn query_status(&self, transaction_id: &str) -> AppResult<GatewayStatusReport>;
}
