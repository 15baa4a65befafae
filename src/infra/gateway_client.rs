use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        GatewayOrder, GatewayRedirect, GatewayStatusReport, PaymentGatewayPort,
    },
    domain::entities::gateway_outcome::GatewayOutcome,
    infra::signature::ChecksumSigner,
};

const PAY_PATH: &str = "/pg/v1/pay";
const STATUS_PATH: &str = "/pg/v1/status";
const VERIFY_HEADER: &str = "X-VERIFY";
const MERCHANT_HEADER: &str = "X-MERCHANT-ID";

/// Client for the gateway's hosted "pay page" API.
#[derive(Clone)]
pub struct HttpGatewayClient {
    client: Client,
    api_base: String,
    merchant_id: String,
    signer: ChecksumSigner,
    /// Page the browser returns to after paying
    redirect_url: String,
    /// Server-to-server notification URL
    callback_url: String,
    require_signed_status: bool,
}

impl HttpGatewayClient {
    pub fn new(
        client: Client,
        api_base: String,
        merchant_id: String,
        signer: ChecksumSigner,
        redirect_url: String,
        callback_url: String,
        require_signed_status: bool,
    ) -> Self {
        Self {
            client,
            api_base,
            merchant_id,
            signer,
            redirect_url,
            callback_url,
            require_signed_status,
        }
    }

    fn status_path(&self, transaction_id: &str) -> String {
        format!("{}/{}/{}", STATUS_PATH, self.merchant_id, transaction_id)
    }

    /// Reads the body and maps transport failures and non-2xx statuses.
    async fn read_body(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> AppResult<(Option<String>, String)> {
        let status = response.status();
        let checksum = response
            .headers()
            .get(VERIFY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| {
            AppError::Gateway(format!("Failed to read {} response: {}", operation, e))
        })?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, operation, "Gateway API error");
            return Err(AppError::Gateway(format!(
                "{} returned HTTP {}",
                operation, status
            )));
        }

        Ok((checksum, body))
    }

    fn verify_status_checksum(&self, checksum: Option<&str>, body: &str) -> AppResult<()> {
        match checksum {
            Some(claimed) if self.signer.verify(&[body], claimed) => Ok(()),
            Some(_) => {
                tracing::warn!(security_event = true, "Gateway status response failed checksum");
                Err(AppError::Gateway(
                    "Status response checksum mismatch".to_string(),
                ))
            }
            None if self.require_signed_status => Err(AppError::Gateway(
                "Status response is not signed".to_string(),
            )),
            None => Ok(()),
        }
    }
}

fn parse<T: for<'de> Deserialize<'de>>(body: &str, operation: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(body = %body, error = %e, operation, "Failed to parse gateway response");
        AppError::Gateway(format!("Failed to parse {} response", operation))
    })
}

#[async_trait]
impl PaymentGatewayPort for HttpGatewayClient {
    async fn create_payment(&self, order: &GatewayOrder) -> AppResult<GatewayRedirect> {
        let payload = PayRequestPayload {
            merchant_id: &self.merchant_id,
            merchant_transaction_id: &order.transaction_id,
            merchant_user_id: &order.user_id,
            amount: order.amount,
            redirect_url: format!("{}?txn={}", self.redirect_url, order.transaction_id),
            redirect_mode: "REDIRECT",
            callback_url: &self.callback_url,
            payment_instrument: PayInstrument { kind: "PAY_PAGE" },
        };
        let payload_json = serde_json::to_vec(&payload)
            .map_err(|e| AppError::Internal(format!("Failed to encode pay request: {}", e)))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(payload_json);
        let checksum = self.signer.sign(&[&encoded, PAY_PATH]);

        let response = self
            .client
            .post(format!("{}{}", self.api_base, PAY_PATH))
            .header(VERIFY_HEADER, checksum)
            .json(&serde_json::json!({ "request": encoded }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, transaction_id = %order.transaction_id, "Gateway unreachable");
                AppError::Gateway(format!("Pay request failed: {}", e))
            })?;

        let (_, body) = self.read_body(response, "pay").await?;
        let parsed: PayResponse = parse(&body, "pay")?;

        if !parsed.success {
            return Err(AppError::Gateway(format!(
                "Pay request rejected: {}",
                parsed.code.unwrap_or_default()
            )));
        }

        let data = parsed
            .data
            .ok_or_else(|| AppError::Gateway("Pay response has no data".to_string()))?;
        let redirect_url = data
            .instrument_response
            .and_then(|r| r.redirect_info)
            .map(|r| r.url)
            .ok_or_else(|| AppError::Gateway("Pay response has no redirect URL".to_string()))?;

        Ok(GatewayRedirect {
            reference: data
                .merchant_transaction_id
                .unwrap_or_else(|| order.transaction_id.clone()),
            redirect_url,
        })
    }

    async fn query_status(&self, transaction_id: &str) -> AppResult<GatewayStatusReport> {
        let path = self.status_path(transaction_id);
        let checksum = self.signer.sign(&[&path]);

        let response = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .header(VERIFY_HEADER, checksum)
            .header(MERCHANT_HEADER, &self.merchant_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, transaction_id = %transaction_id, "Gateway unreachable");
                AppError::Gateway(format!("Status request failed: {}", e))
            })?;

        let (response_checksum, body) = self.read_body(response, "status").await?;
        self.verify_status_checksum(response_checksum.as_deref(), &body)?;

        let raw: serde_json::Value = parse(&body, "status")?;
        let parsed: StatusResponse = parse(&body, "status")?;
        let data = parsed.data.unwrap_or_default();

        Ok(GatewayStatusReport {
            outcome: GatewayOutcome::from_code(&parsed.code),
            code: parsed.code,
            gateway_payment_id: data.transaction_id,
            payment_method: data.payment_instrument.and_then(|i| i.kind),
            message: parsed.message,
            raw,
        })
    }
}

// ============================================================================
// Gateway Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayRequestPayload<'a> {
    merchant_id: &'a str,
    merchant_transaction_id: &'a str,
    merchant_user_id: &'a str,
    amount: i64,
    redirect_url: String,
    redirect_mode: &'a str,
    callback_url: &'a str,
    payment_instrument: PayInstrument<'a>,
}

#[derive(Debug, Serialize)]
struct PayInstrument<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct PayResponse {
    #[serde(default)]
    success: bool,
    code: Option<String>,
    data: Option<PayResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayResponseData {
    merchant_transaction_id: Option<String>,
    instrument_response: Option<InstrumentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstrumentResponse {
    redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Deserialize)]
struct RedirectInfo {
    url: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    code: String,
    message: Option<String>,
    data: Option<StatusResponseData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponseData {
    transaction_id: Option<String>,
    payment_instrument: Option<StatusInstrument>,
}

#[derive(Debug, Deserialize)]
struct StatusInstrument {
    #[serde(rename = "type")]
    kind: Option<String>,
}
