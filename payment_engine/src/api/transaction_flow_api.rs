use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;
use ppg_common::Secret;

use crate::{
    api::errors::PaymentFlowError,
    db_types::{NewTransaction, Provider, Transaction, TransactionStatus, TransactionType, TxReference},
    helpers::{new_refund_uuid, NotificationSigner},
    providers::{normalize, CanonicalOutcome, ProviderClient, ProviderOutcome},
    traits::TransactionStore,
};

pub const DEFAULT_TRANSACTION_EXPIRY_SECS: i64 = 60;

//--------------------------------------     FlowConfig       --------------------------------------------------------
/// Tunables for the reconciliation flows, injected at construction time.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// How long a pending transaction stays eligible for settlement notifications.
    pub transaction_expiry: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self { transaction_expiry: Duration::seconds(DEFAULT_TRANSACTION_EXPIRY_SECS) }
    }
}

//--------------------------------------  NotificationEvent   --------------------------------------------------------
/// A verified-shape inbound provider notification, after the HTTP layer has pulled the fields out of the
/// provider-specific form. `signature` covers `uuid` (see [`NotificationSigner`]).
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub uuid: TxReference,
    pub signature: String,
    pub provider: Provider,
    pub response_code: String,
    pub response_message: Option<String>,
    /// The provider-assigned settlement id, stored as `uid_support` on a successful settlement.
    pub provider_txid: Option<String>,
}

//--------------------------------------    ApplyContext      --------------------------------------------------------
/// Which flow is asking for a transition. The legal edge set differs per flow: only a refund status poll may move
/// a settled refund to `Failed`, and only a payment status poll may reach `Checked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyContext {
    Notification,
    RefundPoll,
    PaymentPoll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Move(TransactionStatus),
    /// Idempotent no-op: the observed outcome is already reflected in the ledger.
    Stay,
}

/// The transition table of the state machine. Pure: no I/O, no clock.
///
/// | From \ Outcome | Ok        | Pending | Cancelled | AlreadyDone | Fatal     |
/// |----------------|-----------|---------|-----------|-------------|-----------|
/// | Pending        | Completed | Stay    | Cancelled | Stay        | Failed    |
/// | Completed      | Stay¹     | Stay²   | Err       | Stay        | Failed³   |
/// | Failed         | Err       | Err     | Err       | Stay        | Stay²     |
/// | Cancelled      | Err       | Err     | Stay      | Stay        | Err       |
/// | Checked        | Stay⁴     | Err     | Err       | Stay        | Err       |
///
/// ¹ duplicate delivery of a settlement notification. On a payment poll this edge is `Completed → Checked`.
/// ² refund polls only; a settled refund never regresses to Pending.
/// ³ refund polls only: the provider can discover that a refund it reported settled in fact failed.
/// ⁴ a repeated payment poll; the row stays Checked.
/// `RetryableFailure` never transitions; it surfaces as a retryable error with the ledger untouched.
pub(crate) fn transition_for(
    tx: &Transaction,
    outcome: CanonicalOutcome,
    ctx: ApplyContext,
) -> Result<Transition, PaymentFlowError> {
    use CanonicalOutcome as O;
    use TransactionStatus as S;

    let conflict = |tx: &Transaction| PaymentFlowError::Conflict {
        uuid: tx.uuid.clone(),
        status: tx.status,
        outcome: outcome.to_string(),
    };
    if outcome == O::RetryableFailure {
        return Err(PaymentFlowError::RetryableProvider(format!(
            "provider reported a transient failure for {}",
            tx.uuid
        )));
    }
    if outcome == O::AlreadyDone {
        // Provider-side idempotence signal. Nothing to reconcile locally.
        return Ok(Transition::Stay);
    }
    let transition = match ctx {
        ApplyContext::Notification => match (tx.status, outcome) {
            (S::Pending, O::Ok) => Transition::Move(S::Completed),
            (S::Completed, O::Ok) => Transition::Stay,
            (S::Pending, O::Pending) => Transition::Stay,
            (S::Pending, O::Cancelled) => Transition::Move(S::Cancelled),
            (S::Cancelled, O::Cancelled) => Transition::Stay,
            (S::Pending, O::FatalFailure) => Transition::Move(S::Failed),
            (S::Failed, O::FatalFailure) => Transition::Stay,
            _ => return Err(conflict(tx)),
        },
        ApplyContext::RefundPoll => match (tx.status, outcome) {
            (S::Pending, O::Ok) => Transition::Move(S::Completed),
            (S::Completed, O::Ok) => Transition::Stay,
            (S::Pending | S::Completed, O::Pending) => Transition::Stay,
            (S::Pending | S::Completed, O::FatalFailure) => Transition::Move(S::Failed),
            (S::Failed, O::FatalFailure) => Transition::Stay,
            _ => return Err(conflict(tx)),
        },
        ApplyContext::PaymentPoll => match (tx.status, outcome) {
            (S::Completed, O::Ok) => Transition::Move(S::Checked),
            (S::Checked, O::Ok) => Transition::Stay,
            // The poll can observe a settlement the notification for which has not arrived yet.
            (S::Pending, O::Ok) => Transition::Move(S::Completed),
            (S::Pending, O::Pending) => Transition::Stay,
            _ => return Err(conflict(tx)),
        },
    };
    Ok(transition)
}

//------------------------------------  TransactionFlowApi    --------------------------------------------------------
/// `TransactionFlowApi` is the primary API for the payment ledger: it records new transactions, reconciles inbound
/// provider notifications against them, orchestrates refunds, and serves status-check polls.
pub struct TransactionFlowApi<B, C> {
    db: B,
    client: C,
    signer: NotificationSigner,
    config: FlowConfig,
}

impl<B, C> Debug for TransactionFlowApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionFlowApi")
    }
}

impl<B, C> TransactionFlowApi<B, C> {
    pub fn new(db: B, client: C, signing_secret: Secret<String>, config: FlowConfig) -> Self {
        let signer = NotificationSigner::new(signing_secret);
        Self { db, client, signer, config }
    }

    pub fn signer(&self) -> &NotificationSigner {
        &self.signer
    }
}

impl<B, C> TransactionFlowApi<B, C>
where
    B: TransactionStore,
    C: ProviderClient,
{
    /// Records a brand-new pending payment in the ledger.
    ///
    /// The uuid must be unique for the provider; a duplicate submission returns `AlreadyExists` and leaves the
    /// original untouched.
    pub async fn initiate_payment(&self, tx: NewTransaction) -> Result<Transaction, PaymentFlowError> {
        if !tx.amount.is_positive() {
            return Err(PaymentFlowError::Validation("amount must be positive".into()));
        }
        if tx.currency.len() != 3 {
            return Err(PaymentFlowError::Validation(format!("'{}' is not an ISO currency code", tx.currency)));
        }
        let tx = self.db.insert_transaction(tx).await?;
        debug!("💰️ Payment [{}] recorded as {} for {}", tx.uuid, tx.status, tx.provider);
        Ok(tx)
    }

    /// Fetches the ledger record for a correlation id.
    pub async fn fetch_transaction(&self, uuid: &TxReference) -> Result<Transaction, PaymentFlowError> {
        self.db
            .fetch_transaction_by_uuid(uuid)
            .await?
            .ok_or_else(|| PaymentFlowError::NotFound(uuid.clone()))
    }

    /// Processes an asynchronous provider notification. This is the reconciliation entry point.
    ///
    /// The protocol, in order: verify the signature; look the transaction up (provider-scoped); reject expired
    /// pending transactions; normalize the raw code via the provider adapter; apply the outcome through the state
    /// machine under compare-and-swap. Duplicate deliveries of an already-applied settlement are answered with
    /// success and change nothing.
    ///
    /// An unrecognised response code marks a pending transaction `Failed` so the ledger stays consistent, and then
    /// propagates the provider error to the caller. Protocol drift is an escalation path, not a soft failure.
    pub async fn process_notification(&self, event: NotificationEvent) -> Result<Transaction, PaymentFlowError> {
        if !self.signer.verify(event.uuid.as_str(), &event.signature) {
            warn!("🔔️ Rejected notification for [{}]: signature mismatch", event.uuid);
            return Err(PaymentFlowError::InvalidSignature);
        }
        let tx = self
            .db
            .fetch_transaction_by_uuid_for_provider(&event.uuid, event.provider)
            .await?
            .ok_or_else(|| PaymentFlowError::NotFound(event.uuid.clone()))?;
        if tx.is_expired(self.config.transaction_expiry, Utc::now()) {
            warn!("🔔️ Rejected notification for [{}]: pending transaction has expired", tx.uuid);
            return Err(PaymentFlowError::Expired(tx.uuid));
        }
        let outcome = match normalize(event.provider, &event.response_code, event.response_message.as_deref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("🔔️ {e}. Marking [{}] as failed and escalating.", tx.uuid);
                self.fail_on_unrecognized_code(&tx).await?;
                return Err(e.into());
            },
        };
        let updated =
            self.apply_outcome(&tx, &outcome, event.provider_txid.clone(), ApplyContext::Notification).await?;
        debug!("🔔️ Notification for [{}] applied: {} -> {}", updated.uuid, tx.status, updated.status);
        Ok(updated)
    }

    /// Issues a refund against a completed payment.
    ///
    /// Legality is checked before the provider is called, so an illegal request costs no external side effect:
    /// the target must be a `Completed` `Payment` on the given provider with no existing non-`Failed` refund.
    ///
    /// On provider success a `Refund` transaction linked via `related` is recorded (`Completed`, or `Pending` when
    /// the provider is still settling it). If the provider reports the payment was already refunded, no local row
    /// is created and `AlreadyRefunded` is returned: recording a ledger entry for a refund that did not happen on
    /// this call would double-count it.
    pub async fn refund(&self, uuid: &TxReference, provider: Provider) -> Result<Transaction, PaymentFlowError> {
        let payment = self
            .db
            .fetch_transaction_by_uuid(uuid)
            .await?
            .ok_or_else(|| PaymentFlowError::NotFound(uuid.clone()))?;
        self.check_refund_legality(&payment, provider).await?;
        let uid_pay = payment.uid_pay.as_deref().ok_or_else(|| {
            PaymentFlowError::CantRefund { uuid: uuid.clone(), reason: "payment has no provider id".into() }
        })?;
        let response = self.client.refund(provider, uid_pay, payment.amount, &payment.currency).await?;
        let outcome = normalize(provider, &response.code, response.message.as_deref())?;
        let status = match outcome.status {
            CanonicalOutcome::Ok => TransactionStatus::Completed,
            CanonicalOutcome::Pending => TransactionStatus::Pending,
            CanonicalOutcome::AlreadyDone => {
                info!("↩️ Provider reports [{uuid}] was already refunded. No ledger entry created.");
                return Err(PaymentFlowError::AlreadyRefunded(uuid.clone()));
            },
            CanonicalOutcome::RetryableFailure => {
                return Err(PaymentFlowError::RetryableProvider(format!("refund of {uuid} can be retried")));
            },
            other => {
                warn!("↩️ Provider refused to refund [{uuid}]: {} ({other})", outcome.code);
                return Err(PaymentFlowError::CantRefund { uuid: uuid.clone(), reason: outcome.code });
            },
        };
        let mut refund = NewTransaction::refund_of(&payment, TxReference(new_refund_uuid(uuid.as_str())), status);
        if let Some(txid) = response.provider_txid.as_deref() {
            refund = refund.with_uid_pay(txid);
        }
        let refund = self.db.insert_transaction(refund).await?;
        info!("↩️ Refund [{}] recorded as {} against payment [{}]", refund.uuid, refund.status, payment.uuid);
        Ok(refund)
    }

    /// Polls the provider for the current state of a refund and re-settles the local record.
    ///
    /// A `Pending` refund resolves to `Completed` or `Failed`; a `Completed` refund can still be discovered
    /// `Failed`, but never regresses to `Pending`. Returns the live provider outcome together with the (possibly
    /// updated) local record.
    pub async fn check_refund_status(
        &self,
        uuid: &TxReference,
    ) -> Result<(ProviderOutcome, Transaction), PaymentFlowError> {
        let refund = self
            .db
            .fetch_transaction_by_uuid(uuid)
            .await?
            .ok_or_else(|| PaymentFlowError::NotFound(uuid.clone()))?;
        if refund.kind != TransactionType::Refund {
            return Err(PaymentFlowError::NotRefund(uuid.clone()));
        }
        let uid_pay = refund
            .uid_pay
            .as_deref()
            .ok_or_else(|| PaymentFlowError::Validation(format!("refund {uuid} has no provider id")))?;
        let response = self.client.refund_status(refund.provider, uid_pay).await?;
        let outcome = normalize(refund.provider, &response.code, response.message.as_deref())?;
        let updated = self.apply_outcome(&refund, &outcome, None, ApplyContext::RefundPoll).await?;
        debug!("↩️ Refund [{}] status check: provider says {}, ledger is {}", uuid, outcome.status, updated.status);
        Ok((outcome, updated))
    }

    /// Polls the provider for the current state of a completed payment, marking it `Checked` on a verified OK.
    pub async fn check_payment_status(
        &self,
        uuid: &TxReference,
    ) -> Result<(ProviderOutcome, Transaction), PaymentFlowError> {
        let payment = self
            .db
            .fetch_transaction_by_uuid(uuid)
            .await?
            .ok_or_else(|| PaymentFlowError::NotFound(uuid.clone()))?;
        if payment.kind != TransactionType::Payment {
            return Err(PaymentFlowError::Validation(format!("{uuid} is not a payment")));
        }
        let uid_pay = payment
            .uid_pay
            .as_deref()
            .ok_or_else(|| PaymentFlowError::Validation(format!("payment {uuid} has no provider id")))?;
        let response = self.client.payment_status(payment.provider, uid_pay).await?;
        let outcome = normalize(payment.provider, &response.code, response.message.as_deref())?;
        let updated = self.apply_outcome(&payment, &outcome, None, ApplyContext::PaymentPoll).await?;
        Ok((outcome, updated))
    }

    /// Commits a transition through the store's compare-and-swap primitive.
    ///
    /// On a CAS miss the row is re-read and legality re-checked, so two racing flows can never both move the same
    /// transaction: one of them observes the other's write and either lands on an idempotent no-op or surfaces a
    /// conflict. The loop terminates because statuses only ever move toward terminal states.
    async fn apply_outcome(
        &self,
        tx: &Transaction,
        outcome: &ProviderOutcome,
        uid_support: Option<String>,
        ctx: ApplyContext,
    ) -> Result<Transaction, PaymentFlowError> {
        let mut current = tx.clone();
        loop {
            match transition_for(&current, outcome.status, ctx)? {
                Transition::Stay => return Ok(current),
                Transition::Move(new_status) => {
                    match self
                        .db
                        .update_status_checked(current.id, current.status, new_status, uid_support.clone())
                        .await?
                    {
                        Some(updated) => return Ok(updated),
                        None => {
                            debug!(
                                "⚖️ Transaction [{}] changed under us ({} no longer current); re-reading",
                                current.uuid, current.status
                            );
                            current = self
                                .db
                                .fetch_transaction(current.id)
                                .await?
                                .ok_or_else(|| PaymentFlowError::NotFound(current.uuid.clone()))?;
                        },
                    }
                },
            }
        }
    }

    /// Best-effort `Failed` marker for a pending transaction that received an unmappable code. A conflict here
    /// means another flow already settled the row; the provider error still propagates either way.
    async fn fail_on_unrecognized_code(&self, tx: &Transaction) -> Result<(), PaymentFlowError> {
        if tx.status != TransactionStatus::Pending {
            return Ok(());
        }
        let outcome = ProviderOutcome::new("FATAL_FAILURE", CanonicalOutcome::FatalFailure);
        match self.apply_outcome(tx, &outcome, None, ApplyContext::Notification).await {
            Ok(_) | Err(PaymentFlowError::Conflict { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn check_refund_legality(
        &self,
        payment: &Transaction,
        provider: Provider,
    ) -> Result<(), PaymentFlowError> {
        let cant = |reason: &str| PaymentFlowError::CantRefund {
            uuid: payment.uuid.clone(),
            reason: reason.to_string(),
        };
        if payment.kind != TransactionType::Payment {
            return Err(cant("only payments can be refunded"));
        }
        if payment.provider != provider {
            return Err(cant("payment belongs to a different provider"));
        }
        if payment.status != TransactionStatus::Completed {
            return Err(cant("payment is not completed"));
        }
        if self.db.fetch_refund_of(payment.id).await?.is_some() {
            return Err(PaymentFlowError::AlreadyRefunded(payment.uuid.clone()));
        }
        Ok(())
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
