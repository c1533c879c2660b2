use payment_engine::{
    db_types::{Provider, Transaction, TxReference},
    NotificationEvent,
};
use ppg_common::Amount;
use serde::{Deserialize, Serialize};

/// The inbound Bango notification form. `moz_signature` is the HMAC over `moz_transaction`; the remaining fields
/// are carried through from Bango's billing flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BangoNotification {
    pub moz_transaction: String,
    pub moz_signature: String,
    #[serde(default)]
    pub billing_config_id: Option<String>,
    #[serde(default)]
    pub bango_trans_id: Option<String>,
    pub bango_response_code: String,
    #[serde(default)]
    pub bango_response_message: Option<String>,
}

impl From<BangoNotification> for NotificationEvent {
    fn from(n: BangoNotification) -> Self {
        NotificationEvent {
            uuid: TxReference(n.moz_transaction),
            signature: n.moz_signature,
            provider: Provider::Bango,
            response_code: n.bango_response_code,
            response_message: n.bango_response_message,
            provider_txid: n.bango_trans_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionRequest {
    pub uuid: String,
    pub provider: Provider,
    /// The amount in minor units.
    pub amount: Amount,
    pub currency: String,
    #[serde(default)]
    pub uid_pay: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub uuid: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureRequest {
    pub customer_id: String,
}

/// The `{status, resource_pk}` reply of the mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub status: String,
    pub resource_pk: i64,
}

impl ResourceResponse {
    pub fn ok(resource_pk: i64) -> Self {
        Self { status: "OK".to_string(), resource_pk }
    }
}

/// The `{status}` reply of the status-check endpoints, reflecting the live provider poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    /// The ledger status after the poll's side effect was applied.
    pub local_status: String,
}

impl StatusResponse {
    pub fn new(provider_status: impl ToString, tx: &Transaction) -> Self {
        Self { status: provider_status.to_string(), local_status: tx.status.to_string() }
    }
}
