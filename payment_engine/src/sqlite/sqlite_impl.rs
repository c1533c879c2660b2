//! `SqliteDatabase` is a concrete implementation of a payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`TransactionStore`] trait. Both uniqueness
//! invariants of the ledger (correlation ids per provider, single non-failed refund per payment) are enforced by
//! the schema itself, so they hold even against concurrent writers.
use std::fmt::Debug;

use sqlx::SqlitePool;

use super::db::{new_pool, paymethods, run_migrations, transactions};
use crate::{
    db_types::{NewTransaction, PayMethod, Provider, Subscription, Transaction, TransactionStatus, TxReference},
    traits::{TransactionStore, TransactionStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url` and brings the schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, TransactionStoreError> {
        let pool = new_pool(url, max_connections).await?;
        run_migrations(&pool).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Registers a provider-side payment instrument for a customer. Called by the account-provisioning
    /// collaborator, not by the reconciliation flows.
    pub async fn insert_paymethod(
        &self,
        customer_id: &str,
        provider: Provider,
        provider_id: &str,
    ) -> Result<PayMethod, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let method = paymethods::insert_paymethod(customer_id, provider, provider_id, &mut conn).await?;
        Ok(method)
    }

    pub async fn insert_subscription(
        &self,
        paymethod_id: i64,
        provider_id: &str,
    ) -> Result<Subscription, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let sub = paymethods::insert_subscription(paymethod_id, provider_id, &mut conn).await?;
        Ok(sub)
    }
}

impl TransactionStore for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::insert_transaction(tx, &mut conn).await
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction(id, &mut conn).await?;
        Ok(tx)
    }

    async fn fetch_transaction_by_uuid(
        &self,
        uuid: &TxReference,
    ) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction_by_uuid(uuid, &mut conn).await?;
        Ok(tx)
    }

    async fn fetch_transaction_by_uuid_for_provider(
        &self,
        uuid: &TxReference,
        provider: Provider,
    ) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction_by_uuid_for_provider(uuid, provider, &mut conn).await?;
        Ok(tx)
    }

    async fn update_status_checked(
        &self,
        id: i64,
        expected: TransactionStatus,
        new: TransactionStatus,
        uid_support: Option<String>,
    ) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::update_status_checked(id, expected, new, uid_support, &mut conn).await?;
        Ok(tx)
    }

    async fn fetch_refund_of(&self, payment_id: i64) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_refund_of(payment_id, &mut conn).await?;
        Ok(tx)
    }

    async fn count_transactions(&self) -> Result<i64, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let count = transactions::count_transactions(&mut conn).await?;
        Ok(count)
    }

    async fn fetch_active_paymethods(&self, customer_id: &str) -> Result<Vec<PayMethod>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let methods = paymethods::fetch_active_paymethods(customer_id, &mut conn).await?;
        Ok(methods)
    }

    async fn fetch_active_subscriptions(
        &self,
        paymethod_id: i64,
    ) -> Result<Vec<Subscription>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let subs = paymethods::fetch_active_subscriptions(paymethod_id, &mut conn).await?;
        Ok(subs)
    }

    async fn deactivate_subscription(&self, id: i64) -> Result<(), TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        paymethods::deactivate_subscription(id, &mut conn).await?;
        Ok(())
    }

    async fn deactivate_paymethod(&self, id: i64) -> Result<(), TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        paymethods::deactivate_paymethod(id, &mut conn).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransactionStoreError> {
        self.pool.close().await;
        Ok(())
    }
}
