use mockall::mock;
use payment_engine::{
    db_types::{NewTransaction, PayMethod, Provider, Subscription, Transaction, TransactionStatus, TxReference},
    providers::{ProviderClient, ProviderClientError, RawProviderResponse},
    traits::{TransactionStore, TransactionStoreError},
};
use ppg_common::Amount;

mock! {
    pub Store {}
    impl TransactionStore for Store {
        fn url(&self) -> &str;
        async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction, TransactionStoreError>;
        async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn fetch_transaction_by_uuid(&self, uuid: &TxReference) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn fetch_transaction_by_uuid_for_provider(&self, uuid: &TxReference, provider: Provider) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn update_status_checked(&self, id: i64, expected: TransactionStatus, new: TransactionStatus, uid_support: Option<String>) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn fetch_refund_of(&self, payment_id: i64) -> Result<Option<Transaction>, TransactionStoreError>;
        async fn count_transactions(&self) -> Result<i64, TransactionStoreError>;
        async fn fetch_active_paymethods(&self, customer_id: &str) -> Result<Vec<PayMethod>, TransactionStoreError>;
        async fn fetch_active_subscriptions(&self, paymethod_id: i64) -> Result<Vec<Subscription>, TransactionStoreError>;
        async fn deactivate_subscription(&self, id: i64) -> Result<(), TransactionStoreError>;
        async fn deactivate_paymethod(&self, id: i64) -> Result<(), TransactionStoreError>;
    }
}

mock! {
    pub Client {}
    impl ProviderClient for Client {
        async fn refund(&self, provider: Provider, uid_pay: &str, amount: Amount, currency: &str) -> Result<RawProviderResponse, ProviderClientError>;
        async fn refund_status(&self, provider: Provider, uid_pay: &str) -> Result<RawProviderResponse, ProviderClientError>;
        async fn payment_status(&self, provider: Provider, uid_pay: &str) -> Result<RawProviderResponse, ProviderClientError>;
        async fn cancel_subscription(&self, provider: Provider, provider_id: &str) -> Result<RawProviderResponse, ProviderClientError>;
        async fn delete_payment_method(&self, provider: Provider, provider_id: &str) -> Result<RawProviderResponse, ProviderClientError>;
    }
}
