use thiserror::Error;

use crate::db_types::{
    NewTransaction, PayMethod, Provider, Subscription, Transaction, TransactionStatus, TxReference,
};

/// This trait defines the persistence contract for backends supporting the payment engine.
///
/// The behaviour covers:
/// * Recording new payment and refund transactions.
/// * Looking transactions up by their caller-supplied correlation id.
/// * Committing state-machine transitions with compare-and-swap semantics.
/// * The payment-method and subscription queries needed by the account closure cascade.
#[allow(async_fn_in_trait)]
pub trait TransactionStore {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores a new transaction. The (`uuid`, `provider`) pair is unique; inserting a duplicate returns
    /// [`TransactionStoreError::TransactionAlreadyExists`].
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction, TransactionStoreError>;

    /// Fetches a transaction by its internal id.
    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Fetches a transaction by correlation id, across all providers.
    async fn fetch_transaction_by_uuid(
        &self,
        uuid: &TxReference,
    ) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Fetches a transaction by correlation id, scoped to one provider. Notifications are always provider-scoped.
    async fn fetch_transaction_by_uuid_for_provider(
        &self,
        uuid: &TxReference,
        provider: Provider,
    ) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Commits a status transition if and only if the row still carries `expected`.
    ///
    /// This is the compare-and-swap primitive every status mutation goes through: the UPDATE is predicated on
    /// `(id, status)` and returns `None` when the row has moved on since the caller read it. Callers must then
    /// re-read and re-apply their legality checks. `uid_support` is assigned when provided and left untouched
    /// otherwise. `modified` is bumped on success.
    async fn update_status_checked(
        &self,
        id: i64,
        expected: TransactionStatus,
        new: TransactionStatus,
        uid_support: Option<String>,
    ) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Returns the refund recorded against the given payment, ignoring `Failed` refunds. At most one such refund
    /// can exist; the schema enforces it.
    async fn fetch_refund_of(&self, payment_id: i64) -> Result<Option<Transaction>, TransactionStoreError>;

    /// Total number of transactions in the ledger.
    async fn count_transactions(&self) -> Result<i64, TransactionStoreError>;

    /// Active payment methods owned by the customer.
    async fn fetch_active_paymethods(&self, customer_id: &str) -> Result<Vec<PayMethod>, TransactionStoreError>;

    /// Active subscriptions billed through the payment method.
    async fn fetch_active_subscriptions(
        &self,
        paymethod_id: i64,
    ) -> Result<Vec<Subscription>, TransactionStoreError>;

    /// Marks a subscription inactive.
    async fn deactivate_subscription(&self, id: i64) -> Result<(), TransactionStoreError>;

    /// Marks a payment method inactive.
    async fn deactivate_paymethod(&self, id: i64) -> Result<(), TransactionStoreError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), TransactionStoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum TransactionStoreError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert transaction, since it already exists with uuid {0}")]
    TransactionAlreadyExists(TxReference),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(TxReference),
    #[error("The requested payment method (id {0}) does not exist")]
    PayMethodNotFound(i64),
    #[error("A refund is already recorded against payment id {0}")]
    RefundAlreadyRecorded(i64),
}

impl From<sqlx::Error> for TransactionStoreError {
    fn from(e: sqlx::Error) -> Self {
        TransactionStoreError::DatabaseError(e.to_string())
    }
}
