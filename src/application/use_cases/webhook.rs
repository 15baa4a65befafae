use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::GatewayStatusReport,
        use_cases::{
            payment::PaymentRepoTrait,
            settlement::{SettlementChannel, SettlementEngine},
        },
    },
    infra::signature::ChecksumSigner,
};

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    response: String,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    code: String,
    message: Option<String>,
    data: WebhookPayloadData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayloadData {
    merchant_transaction_id: String,
    transaction_id: Option<String>,
    payment_instrument: Option<WebhookPaymentInstrument>,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentInstrument {
    #[serde(rename = "type")]
    instrument_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

// ============================================================================
// Use Cases
// ============================================================================

/// Gateway-driven confirmation. Deliveries are at-least-once and may race
/// with client verification.
#[derive(Clone)]
pub struct WebhookUseCases {
    repo: Arc<dyn PaymentRepoTrait>,
    engine: SettlementEngine,
    signer: ChecksumSigner,
}

impl WebhookUseCases {
    pub fn new(
        repo: Arc<dyn PaymentRepoTrait>,
        engine: SettlementEngine,
        signer: ChecksumSigner,
    ) -> Self {
        Self {
            repo,
            engine,
            signer,
        }
    }

    /// Authenticates a delivery and processes it.
    ///
    /// Only an authentication failure is returned as an error. Once the
    /// signature checks out the delivery is acknowledged, and processing
    /// errors are logged instead of bounced back to the gateway.
    pub async fn handle(&self, signature: Option<&str>, body: &[u8]) -> AppResult<WebhookAck> {
        let envelope = self.authenticate(signature, body)?;

        let (payload, raw) = match decode_payload(&envelope.response) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!(error = %e, "Failed to decode gateway webhook");
                return Ok(WebhookAck { received: true });
            }
        };

        let transaction_id = payload.data.merchant_transaction_id.clone();
        if let Err(e) = self.process(payload, raw).await {
            tracing::error!(
                transaction_id = %transaction_id,
                error = %e,
                retryable = e.is_retryable(),
                "Failed to process gateway webhook"
            );
        }

        Ok(WebhookAck { received: true })
    }

    fn authenticate(&self, signature: Option<&str>, body: &[u8]) -> AppResult<WebhookEnvelope> {
        let envelope = match serde_json::from_slice::<WebhookEnvelope>(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    security_event = true,
                    error = %e,
                    "Rejected webhook without a signable payload"
                );
                return Err(AppError::InvalidSignature);
            }
        };

        let verified = signature
            .map(|claimed| self.signer.verify(&[&envelope.response], claimed))
            .unwrap_or(false);
        if !verified {
            tracing::warn!(
                security_event = true,
                signature_present = signature.is_some(),
                "Rejected webhook with invalid signature"
            );
            return Err(AppError::InvalidSignature);
        }

        Ok(envelope)
    }

    async fn process(&self, payload: WebhookPayload, raw: serde_json::Value) -> AppResult<()> {
        let transaction_id = payload.data.merchant_transaction_id.as_str();
        let Some(payment) = self.repo.get_by_transaction_id(transaction_id).await? else {
            tracing::warn!(
                transaction_id = %transaction_id,
                code = %payload.code,
                "Webhook for unknown transaction"
            );
            return Ok(());
        };

        if payment.is_terminal() {
            tracing::debug!(
                transaction_id = %transaction_id,
                status = %payment.status,
                "Duplicate webhook for final payment"
            );
            return Ok(());
        }

        let mut report = GatewayStatusReport::from_code(payload.code.clone());
        report.message = payload.message;
        report.gateway_payment_id = payload.data.transaction_id;
        report.payment_method = payload
            .data
            .payment_instrument
            .and_then(|instrument| instrument.instrument_type);
        report.raw = raw;

        let result = self
            .engine
            .apply(&payment, &report, SettlementChannel::Webhook)
            .await?;

        tracing::info!(
            transaction_id = %payment.transaction_id,
            code = %report.code,
            status = ?result.status,
            "Webhook processed"
        );
        Ok(())
    }
}

/// Base64 `response` field -> typed payload plus the raw JSON for logging.
fn decode_payload(encoded: &str) -> AppResult<(WebhookPayload, serde_json::Value)> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::InvalidInput(format!("Webhook payload is not base64: {}", e)))?;
    let raw: serde_json::Value = serde_json::from_slice(&decoded)
        .map_err(|e| AppError::InvalidInput(format!("Webhook payload is not JSON: {}", e)))?;
    let payload: WebhookPayload = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::InvalidInput(format!("Webhook payload is not valid: {}", e)))?;
    Ok((payload, raw))
}
