use std::sync::Arc;

use chrono::Utc;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::payment_gateway::GatewayStatusReport,
        use_cases::payment::{
            DEFAULT_PAYMENT_METHOD, PaymentRepoTrait, PaymentResult, ReportedStatus,
            SuccessTransition, TransitionResult,
        },
    },
    domain::entities::{
        gateway_outcome::GatewayOutcome,
        payment::Payment,
        settlement::RevenueSplit,
        subscription::{PREMIUM_TIER, Subscription, SubscriptionStatus, UserEntitlement},
    },
};

/// Which confirmation path delivered the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementChannel {
    Verify,
    Webhook,
    Status,
}

impl SettlementChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementChannel::Verify => "verify",
            SettlementChannel::Webhook => "webhook",
            SettlementChannel::Status => "status",
        }
    }
}

/// The single entry point that moves a payment into a terminal state.
///
/// Verification, status polling and webhook deliveries all report gateway
/// outcomes here. The terminal-state check is repeated inside the store's
/// transaction, so concurrent reports for one payment settle it once.
#[derive(Clone)]
pub struct SettlementEngine {
    repo: Arc<dyn PaymentRepoTrait>,
    provider_share_bps: i64,
}

impl SettlementEngine {
    pub fn new(repo: Arc<dyn PaymentRepoTrait>, provider_share_bps: i64) -> Self {
        Self {
            repo,
            provider_share_bps,
        }
    }

    pub async fn apply(
        &self,
        payment: &Payment,
        report: &GatewayStatusReport,
        channel: SettlementChannel,
    ) -> AppResult<PaymentResult> {
        if payment.is_terminal() {
            return Ok(PaymentResult::from_payment(payment));
        }

        match report.outcome {
            GatewayOutcome::Success => self.settle_success(payment, report, channel).await,
            GatewayOutcome::Failed => self.settle_failure(payment, &report.code).await,
            GatewayOutcome::Pending => {
                tracing::debug!(
                    transaction_id = %payment.transaction_id,
                    code = %report.code,
                    "Gateway outcome still pending"
                );
                Ok(PaymentResult::pending(&payment.transaction_id))
            }
        }
    }

    async fn settle_success(
        &self,
        payment: &Payment,
        report: &GatewayStatusReport,
        channel: SettlementChannel,
    ) -> AppResult<PaymentResult> {
        let transition = self.build_transition(payment, report, channel)?;

        match self.repo.apply_success(&transition).await? {
            TransitionResult::Applied => {
                tracing::info!(
                    transaction_id = %payment.transaction_id,
                    user_id = %payment.user_id,
                    plan_id = %payment.plan_id,
                    channel = channel.as_str(),
                    provider_id = ?payment.provider_id,
                    "Payment settled"
                );
                Ok(PaymentResult {
                    transaction_id: payment.transaction_id.clone(),
                    status: ReportedStatus::Success,
                    subscription_end: Some(transition.subscription.ends_at),
                    payment_method: Some(transition.payment_method),
                    error: None,
                })
            }
            TransitionResult::AlreadyFinal(status) => {
                tracing::debug!(
                    transaction_id = %payment.transaction_id,
                    status = %status,
                    channel = channel.as_str(),
                    "Payment already final, settlement skipped"
                );
                self.current_result(&payment.transaction_id).await
            }
            TransitionResult::NotFound => Err(AppError::NotFound),
        }
    }

    async fn settle_failure(&self, payment: &Payment, code: &str) -> AppResult<PaymentResult> {
        if !self.repo.mark_failed(&payment.transaction_id, code).await? {
            tracing::debug!(
                transaction_id = %payment.transaction_id,
                "Payment already final, failure not recorded"
            );
            return self.current_result(&payment.transaction_id).await;
        }

        tracing::info!(
            transaction_id = %payment.transaction_id,
            code = %code,
            "Payment failed"
        );
        Ok(PaymentResult {
            transaction_id: payment.transaction_id.clone(),
            status: ReportedStatus::Failed,
            subscription_end: None,
            payment_method: None,
            error: Some(code.to_string()),
        })
    }

    fn build_transition(
        &self,
        payment: &Payment,
        report: &GatewayStatusReport,
        channel: SettlementChannel,
    ) -> AppResult<SuccessTransition> {
        let plan = payment.plan().ok_or_else(|| {
            AppError::Internal(format!(
                "Payment {} references unknown plan {}",
                payment.transaction_id, payment.plan_id
            ))
        })?;

        let now = Utc::now().naive_utc();
        let ends_at = plan.ends_at_from(now);
        let payment_method = report
            .payment_method
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        let split = payment
            .provider_id
            .as_ref()
            .map(|provider_id| {
                RevenueSplit::compute(provider_id.clone(), payment.amount, self.provider_share_bps)
            });

        let mut audit_details = serde_json::json!({
            "transaction_id": payment.transaction_id,
            "plan_id": payment.plan_id,
            "amount": payment.amount,
            "source": payment.source_context,
            "channel": channel.as_str(),
        });
        if let Some(split) = &split {
            audit_details["provider_id"] = serde_json::json!(split.provider_id);
            audit_details["provider_share"] = serde_json::json!(split.provider_share);
            audit_details["platform_share"] = serde_json::json!(split.platform_share);
        }

        Ok(SuccessTransition {
            transaction_id: payment.transaction_id.clone(),
            user_id: payment.user_id.clone(),
            gateway_payment_id: report.gateway_payment_id.clone(),
            payment_method,
            settled_at: now,
            subscription: Subscription {
                user_id: payment.user_id.clone(),
                plan_id: payment.plan_id.clone(),
                status: SubscriptionStatus::Active,
                starts_at: now,
                ends_at,
                payment_transaction_id: payment.transaction_id.clone(),
                auto_renew: plan.auto_renew(),
            },
            entitlement: UserEntitlement {
                user_id: payment.user_id.clone(),
                tier: PREMIUM_TIER.to_string(),
                status: SubscriptionStatus::Active,
                premium_ends_at: ends_at,
            },
            split,
            audit_details,
        })
    }

    async fn current_result(&self, transaction_id: &str) -> AppResult<PaymentResult> {
        let payment = self
            .repo
            .get_by_transaction_id(transaction_id)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(PaymentResult::from_payment(&payment))
    }
}
