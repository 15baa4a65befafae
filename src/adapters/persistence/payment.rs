use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{
        CreatePaymentInput, PaymentRepoTrait, SuccessTransition, TransitionResult,
    },
    domain::entities::{
        audit_entry::ACTION_PAYMENT_SUCCESS, payment::Payment, payment_status::PaymentStatus,
        settlement::SettlementStatus,
    },
};

const SELECT_COLS: &str = "id, transaction_id, user_id, plan_id, amount, source_context, \
    provider_id, track_id, metadata, status, gateway_reference, gateway_payment_id, \
    payment_method, error_code, settled_at, created_at, updated_at";

fn row_to_payment(row: sqlx::postgres::PgRow) -> Payment {
    Payment {
        id: row.get("id"),
        transaction_id: row.get("transaction_id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        amount: row.get("amount"),
        source_context: row.get("source_context"),
        provider_id: row.get("provider_id"),
        track_id: row.get("track_id"),
        metadata: row.get("metadata"),
        status: row.get("status"),
        gateway_reference: row.get("gateway_reference"),
        gateway_payment_id: row.get("gateway_payment_id"),
        payment_method: row.get("payment_method"),
        error_code: row.get("error_code"),
        settled_at: row.get("settled_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PaymentRepoTrait for PostgresPersistence {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<Payment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (
                id, transaction_id, user_id, plan_id, amount, source_context,
                provider_id, track_id, metadata, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'INITIATED')
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(&input.transaction_id)
        .bind(&input.user_id)
        .bind(&input.plan_id)
        .bind(input.amount)
        .bind(&input.source_context)
        .bind(&input.provider_id)
        .bind(&input.track_id)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_payment(row))
    }

    async fn get_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE transaction_id = $1",
            SELECT_COLS
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_payment))
    }

    async fn mark_pending(
        &self,
        transaction_id: &str,
        gateway_reference: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'PENDING',
                gateway_reference = $2,
                updated_at = NOW() AT TIME ZONE 'utc'
            WHERE transaction_id = $1 AND status = 'INITIATED'
            "#,
        )
        .bind(transaction_id)
        .bind(gateway_reference)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                transaction_id = %transaction_id,
                "Skipped pending transition for payment no longer initiated"
            );
        }
        Ok(result.rows_affected() > 0)
    }

    async fn mark_failed(&self, transaction_id: &str, error_code: &str) -> AppResult<bool> {
        // Terminal payments are never overwritten.
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'FAILED',
                error_code = $2,
                updated_at = NOW() AT TIME ZONE 'utc'
            WHERE transaction_id = $1 AND status IN ('INITIATED', 'PENDING')
            "#,
        )
        .bind(transaction_id)
        .bind(error_code)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_success(&self, transition: &SuccessTransition) -> AppResult<TransitionResult> {
        // Dropping `tx` without commit rolls every write back.
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let current: Option<PaymentStatus> = sqlx::query_scalar(
            "SELECT status FROM payments WHERE transaction_id = $1 FOR UPDATE",
        )
        .bind(&transition.transaction_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::from)?;

        match current {
            None => return Ok(TransitionResult::NotFound),
            Some(status) if status.is_terminal() => {
                return Ok(TransitionResult::AlreadyFinal(status));
            }
            Some(_) => {}
        }

        sqlx::query(
            r#"
            UPDATE payments
            SET status = 'SUCCESS',
                gateway_payment_id = COALESCE($2, gateway_payment_id),
                payment_method = $3,
                settled_at = $4,
                error_code = NULL,
                updated_at = $4
            WHERE transaction_id = $1
            "#,
        )
        .bind(&transition.transaction_id)
        .bind(&transition.gateway_payment_id)
        .bind(&transition.payment_method)
        .bind(transition.settled_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let subscription = &transition.subscription;
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                user_id, plan_id, status, starts_at, ends_at, payment_transaction_id,
                auto_renew, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                status = EXCLUDED.status,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                payment_transaction_id = EXCLUDED.payment_transaction_id,
                auto_renew = EXCLUDED.auto_renew,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&subscription.user_id)
        .bind(&subscription.plan_id)
        .bind(subscription.status.as_str())
        .bind(subscription.starts_at)
        .bind(subscription.ends_at)
        .bind(&subscription.payment_transaction_id)
        .bind(subscription.auto_renew)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        // Entitlement expiry only ever moves forward; a shorter plan bought
        // after a longer one must not cut the paid-for access.
        let entitlement = &transition.entitlement;
        sqlx::query(
            r#"
            INSERT INTO user_entitlements (user_id, tier, status, premium_ends_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW() AT TIME ZONE 'utc')
            ON CONFLICT (user_id) DO UPDATE SET
                tier = EXCLUDED.tier,
                status = EXCLUDED.status,
                premium_ends_at = GREATEST(user_entitlements.premium_ends_at, EXCLUDED.premium_ends_at),
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&entitlement.user_id)
        .bind(&entitlement.tier)
        .bind(entitlement.status.as_str())
        .bind(entitlement.premium_ends_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        if let Some(split) = &transition.split {
            sqlx::query(
                r#"
                INSERT INTO settlements (
                    id, transaction_id, provider_id, total_amount, provider_share,
                    platform_share, status
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&transition.transaction_id)
            .bind(&split.provider_id)
            .bind(split.total_amount)
            .bind(split.provider_share)
            .bind(split.platform_share)
            .bind(SettlementStatus::Pending)
            .execute(&mut *tx)
            .await
            .map_err(AppError::from)?;
        }

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, user_id, action, details, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&transition.user_id)
        .bind(ACTION_PAYMENT_SUCCESS)
        .bind(&transition.audit_details)
        .bind(transition.settled_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from)?;

        tx.commit().await.map_err(AppError::from)?;
        Ok(TransitionResult::Applied)
    }
}
