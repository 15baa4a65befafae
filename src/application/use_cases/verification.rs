use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::PaymentGatewayPort,
        use_cases::{
            payment::{PaymentRepoTrait, PaymentResult},
            settlement::{SettlementChannel, SettlementEngine},
        },
    },
    domain::entities::payment::Payment,
};

/// Client-driven confirmation: callback pages and polling ask the gateway
/// directly instead of waiting for the webhook.
#[derive(Clone)]
pub struct VerificationUseCases {
    repo: Arc<dyn PaymentRepoTrait>,
    gateway: Arc<dyn PaymentGatewayPort>,
    engine: SettlementEngine,
}

impl VerificationUseCases {
    pub fn new(
        repo: Arc<dyn PaymentRepoTrait>,
        gateway: Arc<dyn PaymentGatewayPort>,
        engine: SettlementEngine,
    ) -> Self {
        Self {
            repo,
            gateway,
            engine,
        }
    }

    /// Callback-page confirmation, scoped to the payment's owner.
    pub async fn verify(&self, transaction_id: &str, user_id: &str) -> AppResult<PaymentResult> {
        let payment = self.load_owned(transaction_id, user_id).await?;
        if payment.is_terminal() {
            return Ok(PaymentResult::from_payment(&payment));
        }

        let report = self.gateway.query_status(transaction_id).await?;
        self.engine
            .apply(&payment, &report, SettlementChannel::Verify)
            .await
    }

    /// Read path scoped to the payment's owner. Gateway trouble is reported
    /// as `PENDING` so pollers simply try again.
    pub async fn status(&self, transaction_id: &str, user_id: &str) -> AppResult<PaymentResult> {
        let payment = self.load_owned(transaction_id, user_id).await?;
        if payment.is_terminal() {
            return Ok(PaymentResult::from_payment(&payment));
        }

        let report = match self.gateway.query_status(transaction_id).await {
            Ok(report) => report,
            Err(AppError::Gateway(e)) => {
                tracing::warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "Gateway status check failed, reporting pending"
                );
                return Ok(PaymentResult::from_payment(&payment));
            }
            Err(e) => return Err(e),
        };

        self.engine
            .apply(&payment, &report, SettlementChannel::Status)
            .await
    }

    async fn load_owned(&self, transaction_id: &str, user_id: &str) -> AppResult<Payment> {
        let payment = self
            .repo
            .get_by_transaction_id(transaction_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !payment.is_owned_by(user_id) {
            tracing::warn!(
                transaction_id = %transaction_id,
                user_id = %user_id,
                "Payment requested by another user"
            );
            return Err(AppError::Forbidden);
        }
        Ok(payment)
    }
}
