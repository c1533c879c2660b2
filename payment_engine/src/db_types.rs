use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ppg_common::Amount;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------      Provider       ---------------------------------------------------------
/// The external payment processor a transaction belongs to. `Reference` is the no-network stand-in used for wiring
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum Provider {
    Bango,
    Braintree,
    Paypal,
    Reference,
}

impl Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Bango => write!(f, "Bango"),
            Provider::Braintree => write!(f, "Braintree"),
            Provider::Paypal => write!(f, "Paypal"),
            Provider::Reference => write!(f, "Reference"),
        }
    }
}

impl FromStr for Provider {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bango" => Ok(Self::Bango),
            "Braintree" => Ok(Self::Braintree),
            "Paypal" => Ok(Self::Paypal),
            "Reference" => Ok(Self::Reference),
            s => Err(ConversionError(format!("Invalid provider: {s}"))),
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        value.parse().unwrap_or(Provider::Reference)
    }
}

//--------------------------------------   TransactionType    --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransactionType {
    Payment,
    Refund,
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Payment => write!(f, "Payment"),
            TransactionType::Refund => write!(f, "Refund"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Payment" => Ok(Self::Payment),
            "Refund" => Ok(Self::Refund),
            s => Err(ConversionError(format!("Invalid transaction type: {s}"))),
        }
    }
}

//--------------------------------------  TransactionStatus   --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// The transaction has been initiated locally; the provider has not settled it yet.
    Pending,
    /// The provider confirmed the transaction.
    Completed,
    /// The provider reported a fatal failure, or an unrecognised response code was received.
    Failed,
    /// The provider (or the user, via the provider) cancelled the transaction.
    Cancelled,
    /// A completed payment whose provider-side state has been re-verified by a status check.
    Checked,
}

impl TransactionStatus {
    /// Completed, Failed and Cancelled don't accept ordinary notification transitions any more.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled)
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "Pending"),
            TransactionStatus::Completed => write!(f, "Completed"),
            TransactionStatus::Failed => write!(f, "Failed"),
            TransactionStatus::Cancelled => write!(f, "Cancelled"),
            TransactionStatus::Checked => write!(f, "Checked"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Cancelled" => Ok(Self::Cancelled),
            "Checked" => Ok(Self::Checked),
            s => Err(ConversionError(format!("Invalid transaction status: {s}"))),
        }
    }
}

//--------------------------------------     TxReference      --------------------------------------------------------
/// A lightweight wrapper around the caller-supplied correlation id for a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct TxReference(pub String);

impl FromStr for TxReference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TxReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TxReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TxReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     Transaction      --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub uuid: TxReference,
    pub provider: Provider,
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub currency: String,
    /// For a Refund, the `id` of the Payment it refunds.
    pub related: Option<i64>,
    /// Provider-assigned id for the payment leg, set when the transaction is initiated with the provider.
    pub uid_pay: Option<String>,
    /// Provider-assigned id for the settlement leg, set when the provider's notification arrives.
    pub uid_support: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Transaction {
    /// Whether a pending transaction is older than the given expiry window.
    pub fn is_expired(&self, expiry: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.status == TransactionStatus::Pending && now - self.created > expiry
    }
}

//--------------------------------------    NewTransaction    --------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The caller-supplied correlation id. Unique per provider.
    pub uuid: TxReference,
    pub provider: Provider,
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub currency: String,
    pub related: Option<i64>,
    pub uid_pay: Option<String>,
    pub uid_support: Option<String>,
}

impl NewTransaction {
    pub fn payment(uuid: TxReference, provider: Provider, amount: Amount, currency: &str) -> Self {
        Self {
            uuid,
            provider,
            kind: TransactionType::Payment,
            status: TransactionStatus::Pending,
            amount,
            currency: currency.to_string(),
            related: None,
            uid_pay: None,
            uid_support: None,
        }
    }

    pub fn refund_of(payment: &Transaction, uuid: TxReference, status: TransactionStatus) -> Self {
        Self {
            uuid,
            provider: payment.provider,
            kind: TransactionType::Refund,
            status,
            amount: payment.amount,
            currency: payment.currency.clone(),
            related: Some(payment.id),
            uid_pay: payment.uid_pay.clone(),
            uid_support: None,
        }
    }

    pub fn with_uid_pay(mut self, uid_pay: &str) -> Self {
        self.uid_pay = Some(uid_pay.to_string());
        self
    }
}

//--------------------------------------     PayMethod        --------------------------------------------------------
/// A provider-side payment instrument owned by a customer. Only used by the account closure cascade.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PayMethod {
    pub id: i64,
    pub customer_id: String,
    pub provider: Provider,
    /// The provider-side token for this instrument.
    pub provider_id: String,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

//--------------------------------------    Subscription      --------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub paymethod_id: i64,
    /// The provider-side subscription id.
    pub provider_id: String,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}
