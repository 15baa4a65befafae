//! Scripted gateway for use case and route tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        GatewayOrder, GatewayRedirect, GatewayStatusReport, PaymentGatewayPort,
    },
};

pub const STUB_PAY_PAGE: &str = "https://gateway.test/pay";

/// Answers `PAYMENT_PENDING` for any transaction without a scripted status.
#[derive(Default)]
pub struct StubGateway {
    statuses: Mutex<HashMap<String, String>>,
    fail_create: AtomicBool,
    fail_status: AtomicBool,
    create_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, transaction_id: &str, code: &str) {
        self.statuses
            .lock()
            .unwrap()
            .insert(transaction_id.to_string(), code.to_string());
    }

    /// Every following `create_payment` fails like an unreachable gateway.
    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Every following `query_status` fails like an unreachable gateway.
    pub fn fail_status(&self) {
        self.fail_status.store(true, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGatewayPort for StubGateway {
    async fn create_payment(&self, order: &GatewayOrder) -> AppResult<GatewayRedirect> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("connection refused".into()));
        }
        Ok(GatewayRedirect {
            reference: order.transaction_id.clone(),
            redirect_url: format!("{}/{}", STUB_PAY_PAGE, order.transaction_id),
        })
    }

    async fn query_status(&self, transaction_id: &str) -> AppResult<GatewayStatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("timed out".into()));
        }
        let code = self
            .statuses
            .lock()
            .unwrap()
            .get(transaction_id)
            .cloned()
            .unwrap_or_else(|| "PAYMENT_PENDING".to_string());

        let mut report = GatewayStatusReport::from_code(code);
        report.raw = serde_json::json!({ "code": report.code });
        Ok(report)
    }
}
