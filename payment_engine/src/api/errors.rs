use thiserror::Error;

use crate::{
    db_types::{TransactionStatus, TxReference},
    providers::{ProviderClientError, ProviderError},
    traits::TransactionStoreError,
};

/// The error taxonomy of the payment flows.
///
/// Every variant maps to a stable error-code string via [`PaymentFlowError::error_code`]; callers branch on the
/// code, not on HTTP status alone, so the strings are part of the external contract.
#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("No transaction found for uuid {0}")]
    NotFound(TxReference),
    #[error("A transaction with uuid {0} already exists for this provider")]
    AlreadyExists(TxReference),
    #[error("Notification signature is invalid")]
    InvalidSignature,
    #[error("Transaction {uuid} is {status} and cannot accept outcome {outcome}")]
    Conflict { uuid: TxReference, status: TransactionStatus, outcome: String },
    #[error("Transaction {0} passed its expiry window while still pending")]
    Expired(TxReference),
    #[error("Payment {0} has already been refunded")]
    AlreadyRefunded(TxReference),
    #[error("Transaction {uuid} cannot be refunded: {reason}")]
    CantRefund { uuid: TxReference, reason: String },
    #[error("Transaction {0} is not a refund")]
    NotRefund(TxReference),
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("Transient provider failure, safe to retry: {0}")]
    RetryableProvider(String),
    #[error("Database error: {0}")]
    Database(String),
}

impl PaymentFlowError {
    /// The stable code surfaced to callers alongside the HTTP status.
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentFlowError::Validation(_) => "INVALID_REQUEST",
            PaymentFlowError::NotFound(_) => "NOT_FOUND",
            PaymentFlowError::AlreadyExists(_) => "ALREADY_EXISTS",
            PaymentFlowError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentFlowError::Conflict { .. } => "CONFLICT",
            PaymentFlowError::Expired(_) => "TRANSACTION_EXPIRED",
            PaymentFlowError::AlreadyRefunded(_) => "ALREADY_REFUNDED",
            PaymentFlowError::CantRefund { .. } => "CANT_REFUND",
            PaymentFlowError::NotRefund(_) => "NOT_REFUND",
            PaymentFlowError::Provider(_) => "PROVIDER_ERROR",
            PaymentFlowError::RetryableProvider(_) => "RETRY_LATER",
            PaymentFlowError::Database(_) => "DB_ERROR",
        }
    }
}

impl From<TransactionStoreError> for PaymentFlowError {
    fn from(e: TransactionStoreError) -> Self {
        match e {
            TransactionStoreError::TransactionAlreadyExists(uuid) => PaymentFlowError::AlreadyExists(uuid),
            TransactionStoreError::TransactionNotFound(uuid) => PaymentFlowError::NotFound(uuid),
            TransactionStoreError::RefundAlreadyRecorded(id) => {
                PaymentFlowError::AlreadyRefunded(TxReference(format!("payment-id-{id}")))
            },
            other => PaymentFlowError::Database(other.to_string()),
        }
    }
}

impl From<ProviderClientError> for PaymentFlowError {
    fn from(e: ProviderClientError) -> Self {
        // Timeouts and transport hiccups are safe to retry: provider-side idempotence codes (ALREADY_*) make a
        // replayed operation a no-op.
        PaymentFlowError::RetryableProvider(e.to_string())
    }
}
