//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use chrono::NaiveDateTime;
use secrecy::SecretString;
use url::Url;
use uuid::Uuid;

use crate::{
    application::{jwt, use_cases::payment::generate_transaction_id},
    domain::entities::{payment::Payment, payment_status::PaymentStatus},
    infra::config::{AppConfig, GatewayConfig, GatewayEnvironment, SANDBOX_API_BASE},
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-enough-length";

/// Create a pending monthly payment with sensible defaults.
pub fn create_test_payment(overrides: impl FnOnce(&mut Payment)) -> Payment {
    let transaction_id = generate_transaction_id();
    let mut payment = Payment {
        id: Uuid::new_v4(),
        gateway_reference: Some(transaction_id.clone()),
        transaction_id,
        user_id: "user_1".to_string(),
        plan_id: "premium_monthly".to_string(),
        amount: 29_900,
        source_context: "premium_screen".to_string(),
        provider_id: None,
        track_id: None,
        metadata: serde_json::json!({}),
        status: PaymentStatus::Pending,
        gateway_payment_id: None,
        payment_method: None,
        error_code: None,
        settled_at: None,
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut payment);
    payment
}

/// Create a sandbox configuration that never touches the process environment.
pub fn create_test_config(overrides: impl FnOnce(&mut AppConfig)) -> AppConfig {
    let mut config = AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        database_url: "postgres://localhost/manas_payments_test".to_string(),
        api_base_url: Url::parse("http://localhost:3001").unwrap(),
        app_base_url: Url::parse("http://localhost:3000").unwrap(),
        gateway: GatewayConfig {
            environment: GatewayEnvironment::Sandbox,
            api_base: SANDBOX_API_BASE.to_string(),
            merchant_id: "PGTESTPAYUAT".to_string(),
            salt_key: SecretString::new("test-salt-key".into()),
            salt_index: 1,
            request_timeout: Duration::from_secs(5),
            sandbox_fallback: false,
            require_signed_status: false,
        },
        provider_share_bps: 6_000,
        log_file: String::new(),
    };
    overrides(&mut config);
    config
}

/// Access token for `user_id`, signed with the test config's secret.
pub fn test_token(user_id: &str) -> String {
    jwt::issue(user_id, &SecretString::new(TEST_JWT_SECRET.into()), 3_600).unwrap()
}

/// Returns a fixed datetime for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Returns a test datetime offset by the given number of days.
pub fn test_datetime_offset_days(days: i64) -> NaiveDateTime {
    test_datetime() + chrono::Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_payment_defaults() {
        let payment = create_test_payment(|_| {});
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.plan().map(|p| p.amount), Some(payment.amount));
        assert_eq!(
            payment.gateway_reference.as_deref(),
            Some(payment.transaction_id.as_str())
        );
    }

    #[test]
    fn test_create_test_payment_ids_are_unique() {
        let a = create_test_payment(|_| {});
        let b = create_test_payment(|_| {});
        assert_ne!(a.transaction_id, b.transaction_id);
    }

    #[test]
    fn test_token_round_trips() {
        let claims = jwt::verify(
            &test_token("user_42"),
            &create_test_config(|_| {}).jwt_secret,
        )
        .unwrap();
        assert_eq!(claims.sub, "user_42");
    }
}
