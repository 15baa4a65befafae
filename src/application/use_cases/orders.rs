use std::sync::Arc;

use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::{GatewayOrder, PaymentGatewayPort},
        use_cases::payment::{CreatePaymentInput, PaymentRepoTrait, generate_transaction_id},
    },
    domain::entities::plan::Plan,
};

#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    pub user_id: String,
    pub plan_id: String,
    pub source_context: String,
    pub provider_id: Option<String>,
    pub track_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedOrder {
    pub transaction_id: String,
    pub payment_url: String,
}

#[derive(Clone)]
pub struct OrderUseCases {
    repo: Arc<dyn PaymentRepoTrait>,
    gateway: Arc<dyn PaymentGatewayPort>,
    /// Page the gateway sends the browser back to.
    redirect_url: String,
    /// Local redirect when the gateway is unreachable. Never enabled in production.
    sandbox_fallback: bool,
}

impl OrderUseCases {
    pub fn new(
        repo: Arc<dyn PaymentRepoTrait>,
        gateway: Arc<dyn PaymentGatewayPort>,
        redirect_url: String,
        sandbox_fallback: bool,
    ) -> Self {
        Self {
            repo,
            gateway,
            redirect_url,
            sandbox_fallback,
        }
    }

    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<CreatedOrder> {
        let plan = Plan::find(&input.plan_id)
            .ok_or_else(|| AppError::InvalidPlan(input.plan_id.clone()))?;

        if input.user_id.trim().is_empty() {
            return Err(AppError::InvalidInput("user_id is required".into()));
        }

        let payment = self
            .repo
            .create(&CreatePaymentInput {
                transaction_id: generate_transaction_id(),
                user_id: input.user_id,
                plan_id: plan.id.to_string(),
                amount: plan.amount,
                source_context: input.source_context,
                provider_id: input.provider_id.filter(|p| !p.trim().is_empty()),
                track_id: input.track_id,
                metadata: input.metadata.unwrap_or_else(|| serde_json::json!({})),
            })
            .await?;

        let order = GatewayOrder {
            transaction_id: payment.transaction_id.clone(),
            user_id: payment.user_id.clone(),
            amount: payment.amount,
        };

        let (payment_url, reference) = match self.gateway.create_payment(&order).await {
            Ok(redirect) => (redirect.redirect_url, Some(redirect.reference)),
            Err(e) if self.sandbox_fallback => {
                tracing::warn!(
                    transaction_id = %payment.transaction_id,
                    error = %e,
                    degraded = true,
                    "Gateway unavailable, using sandbox redirect"
                );
                (self.sandbox_redirect(&payment.transaction_id), None)
            }
            Err(e) => {
                tracing::error!(
                    transaction_id = %payment.transaction_id,
                    error = %e,
                    "Gateway rejected payment creation"
                );
                return Err(e);
            }
        };

        self.repo
            .mark_pending(&payment.transaction_id, reference.as_deref())
            .await?;

        tracing::info!(
            transaction_id = %payment.transaction_id,
            user_id = %payment.user_id,
            plan_id = %payment.plan_id,
            amount = payment.amount,
            "Payment created"
        );

        Ok(CreatedOrder {
            transaction_id: payment.transaction_id,
            payment_url,
        })
    }

    fn sandbox_redirect(&self, transaction_id: &str) -> String {
        format!("{}?txn={}&status=SUCCESS", self.redirect_url, transaction_id)
    }
}
