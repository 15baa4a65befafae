use std::sync::Arc;

use crate::{
    application::use_cases::{
        orders::OrderUseCases, verification::VerificationUseCases, webhook::WebhookUseCases,
    },
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub order_use_cases: Arc<OrderUseCases>,
    pub verification_use_cases: Arc<VerificationUseCases>,
    pub webhook_use_cases: Arc<WebhookUseCases>,
}
