use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    api::errors::PaymentFlowError,
    db_types::PayMethod,
    providers::{normalize, CanonicalOutcome, ProviderClient},
    traits::TransactionStore,
};

//--------------------------------------    ClosureReport     --------------------------------------------------------
/// The aggregate result of an account closure sweep.
///
/// Provider failures do not abort the sweep; they are collected here so the account-closure collaborator can decide
/// what to do with a partially-closed account. An empty `failures` list means the cascade completed cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClosureReport {
    pub cancelled_subscriptions: Vec<i64>,
    pub deleted_paymethods: Vec<i64>,
    pub failures: Vec<ClosureFailure>,
}

impl ClosureReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureFailure {
    pub target: ClosureTarget,
    pub id: i64,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosureTarget {
    Subscription,
    PayMethod,
}

//--------------------------------------     ClosureApi       --------------------------------------------------------
/// `ClosureApi` runs the account closure cascade: when a buyer closes their account, every active payment method
/// they own is deleted at the provider, after each method's active subscriptions have been cancelled there.
///
/// A payment method is only deleted once all of its subscriptions cancelled cleanly; otherwise it is left active
/// and reported as a failure, so a later retry of the closure can finish the job.
pub struct ClosureApi<B, C> {
    db: B,
    client: C,
}

impl<B, C> Debug for ClosureApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClosureApi")
    }
}

impl<B, C> ClosureApi<B, C> {
    pub fn new(db: B, client: C) -> Self {
        Self { db, client }
    }
}

impl<B, C> ClosureApi<B, C>
where
    B: TransactionStore,
    C: ProviderClient,
{
    /// Sweeps all active payment methods and subscriptions for the customer. Store errors abort the sweep (the
    /// ledger itself is in trouble); provider errors are collected and the sweep continues.
    pub async fn close_customer(&self, customer_id: &str) -> Result<ClosureReport, PaymentFlowError> {
        let mut report = ClosureReport::default();
        let methods = self.db.fetch_active_paymethods(customer_id).await?;
        if methods.is_empty() {
            info!("🚪️ Customer {customer_id} has no active payment methods. Nothing to close.");
            return Ok(report);
        }
        for method in methods {
            self.close_method(&method, &mut report).await?;
        }
        if report.is_clean() {
            info!(
                "🚪️ Closure for customer {customer_id} complete: {} subscriptions cancelled, {} methods deleted",
                report.cancelled_subscriptions.len(),
                report.deleted_paymethods.len()
            );
        } else {
            warn!(
                "🚪️ Closure for customer {customer_id} left {} failures behind; a retry can finish the sweep",
                report.failures.len()
            );
        }
        Ok(report)
    }

    async fn close_method(&self, method: &PayMethod, report: &mut ClosureReport) -> Result<(), PaymentFlowError> {
        let mut method_blocked = false;
        for sub in self.db.fetch_active_subscriptions(method.id).await? {
            match self.cancel_at_provider(method, &sub.provider_id).await {
                Ok(()) => {
                    self.db.deactivate_subscription(sub.id).await?;
                    debug!("🚪️ Cancelled subscription {} on {}", sub.id, method.provider);
                    report.cancelled_subscriptions.push(sub.id);
                },
                Err(e) => {
                    warn!("🚪️ Could not cancel subscription {}: {e}", sub.id);
                    method_blocked = true;
                    report.failures.push(ClosureFailure {
                        target: ClosureTarget::Subscription,
                        id: sub.id,
                        error: e.to_string(),
                    });
                },
            }
        }
        if method_blocked {
            report.failures.push(ClosureFailure {
                target: ClosureTarget::PayMethod,
                id: method.id,
                error: "not deleted: subscriptions remain active".to_string(),
            });
            return Ok(());
        }
        match self.delete_at_provider(method).await {
            Ok(()) => {
                self.db.deactivate_paymethod(method.id).await?;
                debug!("🚪️ Deleted payment method {} on {}", method.id, method.provider);
                report.deleted_paymethods.push(method.id);
            },
            Err(e) => {
                warn!("🚪️ Could not delete payment method {}: {e}", method.id);
                report.failures.push(ClosureFailure {
                    target: ClosureTarget::PayMethod,
                    id: method.id,
                    error: e.to_string(),
                });
            },
        }
        Ok(())
    }

    async fn cancel_at_provider(&self, method: &PayMethod, provider_id: &str) -> Result<(), PaymentFlowError> {
        let response = self.client.cancel_subscription(method.provider, provider_id).await?;
        let outcome = normalize(method.provider, &response.code, response.message.as_deref())?;
        match outcome.status {
            CanonicalOutcome::Ok | CanonicalOutcome::AlreadyDone | CanonicalOutcome::Cancelled => Ok(()),
            other => Err(PaymentFlowError::RetryableProvider(format!(
                "provider answered {other} to a subscription cancellation"
            ))),
        }
    }

    async fn delete_at_provider(&self, method: &PayMethod) -> Result<(), PaymentFlowError> {
        let response = self.client.delete_payment_method(method.provider, &method.provider_id).await?;
        let outcome = normalize(method.provider, &response.code, response.message.as_deref())?;
        match outcome.status {
            CanonicalOutcome::Ok | CanonicalOutcome::AlreadyDone => Ok(()),
            other => Err(PaymentFlowError::RetryableProvider(format!(
                "provider answered {other} to a payment method deletion"
            ))),
        }
    }
}
