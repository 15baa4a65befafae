//! In-memory stand-in for the Postgres payment store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::{
    adapters::persistence::DUPLICATE_ENTRY,
    app_error::{AppError, AppResult},
    application::use_cases::payment::{
        CreatePaymentInput, PaymentRepoTrait, SuccessTransition, TransitionResult,
    },
    domain::entities::{
        audit_entry::{ACTION_PAYMENT_SUCCESS, AuditEntry},
        payment::Payment,
        payment_status::PaymentStatus,
        settlement::{Settlement, SettlementStatus},
        subscription::{Subscription, UserEntitlement},
    },
};

#[derive(Default, Clone)]
struct StoreState {
    payments: HashMap<String, Payment>,
    subscriptions: HashMap<String, Subscription>,
    entitlements: HashMap<String, UserEntitlement>,
    settlements: Vec<Settlement>,
    audit_log: Vec<AuditEntry>,
}

// ============================================================================
// InMemoryPaymentStore
// ============================================================================

/// Mirrors the transactional guarantees of the Postgres adapter: a success
/// transition is staged on a copy and swapped in whole, or not at all.
#[derive(Default)]
pub struct InMemoryPaymentStore {
    state: Mutex<StoreState>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    subscription_writes: AtomicUsize,
    fail_next_settlement: AtomicBool,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payments(payments: Vec<Payment>) -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock().unwrap();
            for payment in payments {
                state
                    .payments
                    .insert(payment.transaction_id.clone(), payment);
            }
        }
        store
    }

    /// The next `apply_success` fails with a database error after staging its writes.
    pub fn fail_next_settlement(&self) {
        self.fail_next_settlement.store(true, Ordering::SeqCst);
    }

    pub fn payment(&self, transaction_id: &str) -> Option<Payment> {
        self.state
            .lock()
            .unwrap()
            .payments
            .get(transaction_id)
            .cloned()
    }

    pub fn payments(&self) -> Vec<Payment> {
        self.state
            .lock()
            .unwrap()
            .payments
            .values()
            .cloned()
            .collect()
    }

    pub fn payment_count(&self) -> usize {
        self.state.lock().unwrap().payments.len()
    }

    pub fn subscription(&self, user_id: &str) -> Option<Subscription> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .get(user_id)
            .cloned()
    }

    pub fn entitlement(&self, user_id: &str) -> Option<UserEntitlement> {
        self.state
            .lock()
            .unwrap()
            .entitlements
            .get(user_id)
            .cloned()
    }

    pub fn settlements(&self) -> Vec<Settlement> {
        self.state.lock().unwrap().settlements.clone()
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state.lock().unwrap().audit_log.clone()
    }

    /// Number of subscription upserts that were committed.
    pub fn subscription_writes(&self) -> usize {
        self.subscription_writes.load(Ordering::SeqCst)
    }

    /// Number of calls that changed stored state. Seeded payments don't count.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of payment lookups.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentRepoTrait for InMemoryPaymentStore {
    async fn create(&self, input: &CreatePaymentInput) -> AppResult<Payment> {
        let mut state = self.state.lock().unwrap();
        if state.payments.contains_key(&input.transaction_id) {
            return Err(AppError::InvalidInput(DUPLICATE_ENTRY.into()));
        }

        let now = chrono::Utc::now().naive_utc();
        let payment = Payment {
            id: Uuid::new_v4(),
            transaction_id: input.transaction_id.clone(),
            user_id: input.user_id.clone(),
            plan_id: input.plan_id.clone(),
            amount: input.amount,
            source_context: input.source_context.clone(),
            provider_id: input.provider_id.clone(),
            track_id: input.track_id.clone(),
            metadata: input.metadata.clone(),
            status: PaymentStatus::Initiated,
            gateway_reference: None,
            gateway_payment_id: None,
            payment_method: None,
            error_code: None,
            settled_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state
            .payments
            .insert(payment.transaction_id.clone(), payment.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(payment)
    }

    async fn get_by_transaction_id(&self, transaction_id: &str) -> AppResult<Option<Payment>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.payment(transaction_id))
    }

    async fn mark_pending(
        &self,
        transaction_id: &str,
        gateway_reference: Option<&str>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.payments.get_mut(transaction_id) {
            Some(payment) if payment.status == PaymentStatus::Initiated => {
                payment.status = PaymentStatus::Pending;
                payment.gateway_reference = gateway_reference.map(str::to_string);
                payment.updated_at = Some(chrono::Utc::now().naive_utc());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_failed(&self, transaction_id: &str, error_code: &str) -> AppResult<bool> {
        let mut state = self.state.lock().unwrap();
        match state.payments.get_mut(transaction_id) {
            Some(payment) if !payment.status.is_terminal() => {
                payment.status = PaymentStatus::Failed;
                payment.error_code = Some(error_code.to_string());
                payment.updated_at = Some(chrono::Utc::now().naive_utc());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn apply_success(&self, transition: &SuccessTransition) -> AppResult<TransitionResult> {
        let mut state = self.state.lock().unwrap();

        match state.payments.get(&transition.transaction_id) {
            None => return Ok(TransitionResult::NotFound),
            Some(payment) if payment.status.is_terminal() => {
                return Ok(TransitionResult::AlreadyFinal(payment.status));
            }
            Some(_) => {}
        }

        let mut staged = state.clone();

        if let Some(payment) = staged.payments.get_mut(&transition.transaction_id) {
            payment.status = PaymentStatus::Success;
            if transition.gateway_payment_id.is_some() {
                payment.gateway_payment_id = transition.gateway_payment_id.clone();
            }
            payment.payment_method = Some(transition.payment_method.clone());
            payment.settled_at = Some(transition.settled_at);
            payment.error_code = None;
            payment.updated_at = Some(transition.settled_at);
        }

        staged.subscriptions.insert(
            transition.subscription.user_id.clone(),
            transition.subscription.clone(),
        );
        let mut entitlement = transition.entitlement.clone();
        if let Some(existing) = staged.entitlements.get(&entitlement.user_id) {
            entitlement.premium_ends_at = entitlement.premium_ends_at.max(existing.premium_ends_at);
        }
        staged
            .entitlements
            .insert(entitlement.user_id.clone(), entitlement);

        if let Some(split) = &transition.split {
            if staged
                .settlements
                .iter()
                .any(|s| s.transaction_id == transition.transaction_id)
            {
                return Err(AppError::InvalidInput(DUPLICATE_ENTRY.into()));
            }
            staged.settlements.push(Settlement {
                id: Uuid::new_v4(),
                transaction_id: transition.transaction_id.clone(),
                provider_id: split.provider_id.clone(),
                total_amount: split.total_amount,
                provider_share: split.provider_share,
                platform_share: split.platform_share,
                status: SettlementStatus::Pending,
                created_at: Some(transition.settled_at),
            });
        }

        staged.audit_log.push(AuditEntry {
            id: Uuid::new_v4(),
            user_id: transition.user_id.clone(),
            action: ACTION_PAYMENT_SUCCESS.to_string(),
            details: transition.audit_details.clone(),
            created_at: transition.settled_at,
        });

        // Simulated failure before commit: staged writes are discarded.
        if self.fail_next_settlement.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database("Database operation failed".into()));
        }

        *state = staged;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.subscription_writes.fetch_add(1, Ordering::SeqCst);
        Ok(TransitionResult::Applied)
    }
}
