//! The outbound seam to provider SDKs.
//!
//! Real provider clients (Bango's SOAP-ish API, Braintree's SDK) live outside this crate. The engine only needs the
//! small surface below, and implementations are expected to bound every call with a timeout: the flow APIs treat
//! [`ProviderClientError::Timeout`] as retryable, which is safe because providers report replayed operations with
//! their `ALREADY_*` codes.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use ppg_common::Amount;
use thiserror::Error;

use crate::db_types::Provider;

//------------------------------------  RawProviderResponse   --------------------------------------------------------
/// An untranslated provider reply. `code` feeds the adapter tables; `provider_txid` carries the provider-assigned
/// correlation id when the operation creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProviderResponse {
    pub code: String,
    pub message: Option<String>,
    pub provider_txid: Option<String>,
}

impl RawProviderResponse {
    pub fn new(code: &str) -> Self {
        Self { code: code.to_string(), message: None, provider_txid: None }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_txid(mut self, txid: &str) -> Self {
        self.provider_txid = Some(txid.to_string());
        self
    }
}

//------------------------------------  ProviderClientError   --------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum ProviderClientError {
    #[error("The provider call timed out")]
    Timeout,
    #[error("Transport error talking to the provider: {0}")]
    Transport(String),
    #[error("The provider reply could not be parsed: {0}")]
    Protocol(String),
}

//--------------------------------------  ProviderClient      --------------------------------------------------------
/// Outbound operations against a payment provider.
///
/// Implementations must apply a bounded timeout to every call and surface it as [`ProviderClientError::Timeout`];
/// the engine maps that to the retryable error family rather than failing the transaction.
#[allow(async_fn_in_trait)]
pub trait ProviderClient {
    /// Request a refund of the given payment leg.
    async fn refund(
        &self,
        provider: Provider,
        uid_pay: &str,
        amount: Amount,
        currency: &str,
    ) -> Result<RawProviderResponse, ProviderClientError>;

    /// Poll the provider for the current state of a refund.
    async fn refund_status(&self, provider: Provider, uid_pay: &str)
        -> Result<RawProviderResponse, ProviderClientError>;

    /// Poll the provider for the current state of a payment.
    async fn payment_status(
        &self,
        provider: Provider,
        uid_pay: &str,
    ) -> Result<RawProviderResponse, ProviderClientError>;

    /// Cancel a provider-side subscription. Used by the account closure cascade.
    async fn cancel_subscription(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> Result<RawProviderResponse, ProviderClientError>;

    /// Delete a provider-side payment method. Used by the account closure cascade.
    async fn delete_payment_method(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> Result<RawProviderResponse, ProviderClientError>;
}

//--------------------------------------  ReferenceClient     --------------------------------------------------------
/// A no-network stand-in client.
///
/// Replies are popped from a queue of canned responses; when the queue is empty every call succeeds with `OK` and a
/// fresh provider txid. Push responses to script failure scenarios. This is the default wiring for the `Reference`
/// provider and the workhorse of the engine's integration tests.
#[derive(Clone, Default)]
pub struct ReferenceClient {
    canned: Arc<Mutex<VecDeque<RawProviderResponse>>>,
}

impl ReferenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned by the next provider call.
    pub fn push_response(&self, response: RawProviderResponse) {
        self.canned.lock().expect("reference client lock poisoned").push_back(response);
    }

    fn next_response(&self, op: &str) -> RawProviderResponse {
        let canned = self.canned.lock().expect("reference client lock poisoned").pop_front();
        canned.unwrap_or_else(|| {
            let txid = format!("ref-{op}-{}", rand::random::<u32>());
            RawProviderResponse::new("OK").with_txid(&txid)
        })
    }
}

impl ProviderClient for ReferenceClient {
    async fn refund(
        &self,
        _provider: Provider,
        _uid_pay: &str,
        _amount: Amount,
        _currency: &str,
    ) -> Result<RawProviderResponse, ProviderClientError> {
        Ok(self.next_response("refund"))
    }

    async fn refund_status(
        &self,
        _provider: Provider,
        _uid_pay: &str,
    ) -> Result<RawProviderResponse, ProviderClientError> {
        Ok(self.next_response("refund-status"))
    }

    async fn payment_status(
        &self,
        _provider: Provider,
        _uid_pay: &str,
    ) -> Result<RawProviderResponse, ProviderClientError> {
        Ok(self.next_response("payment-status"))
    }

    async fn cancel_subscription(
        &self,
        _provider: Provider,
        _provider_id: &str,
    ) -> Result<RawProviderResponse, ProviderClientError> {
        Ok(self.next_response("cancel-subscription"))
    }

    async fn delete_payment_method(
        &self,
        _provider: Provider,
        _provider_id: &str,
    ) -> Result<RawProviderResponse, ProviderClientError> {
        Ok(self.next_response("delete-paymethod"))
    }
}
