//! Builders for gateway webhook deliveries signed with the test salt.

use base64::Engine;
use secrecy::SecretString;
use serde_json::{Value, json};

use crate::infra::signature::ChecksumSigner;

pub fn test_signer() -> ChecksumSigner {
    ChecksumSigner::new(SecretString::new("test-salt-key".into()), 1)
}

/// Decoded notification payload as the gateway sends it.
pub fn webhook_payload(transaction_id: &str, code: &str) -> Value {
    json!({
        "success": code == "PAYMENT_SUCCESS",
        "code": code,
        "message": "Notification from gateway",
        "data": {
            "merchantId": "PGTESTPAYUAT",
            "merchantTransactionId": transaction_id,
            "transactionId": format!("T{}", transaction_id.len()),
            "amount": 29_900,
            "state": if code == "PAYMENT_SUCCESS" { "COMPLETED" } else { "FAILED" },
            "paymentInstrument": { "type": "UPI_INTENT" }
        }
    })
}

/// Wraps a payload in the `{response}` envelope and signs it.
/// Returns the request body and the `X-VERIFY` header value.
pub fn signed_webhook(payload: &Value) -> (Vec<u8>, String) {
    let response = base64::engine::general_purpose::STANDARD.encode(payload.to_string());
    let signature = test_signer().sign(&[&response]);
    let body = json!({ "response": response }).to_string().into_bytes();
    (body, signature)
}
