//! Provider response normalization.
//!
//! Each external processor speaks its own response-code dialect. The adapters in this module translate raw provider
//! codes into a small canonical vocabulary that the transaction state machine understands. Adapters are pure
//! translation tables: they know nothing about the `Transaction` entity, and adding a provider means adding one
//! module with one mapping table.
//!
//! Unrecognised codes are never swallowed. They surface as [`ProviderError::UnrecognizedCode`], carrying the raw
//! code and message for operator diagnosis, because an unknown code usually means the provider's protocol has
//! drifted and someone needs to look at it.

mod bango;
mod braintree;
mod client;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{ProviderClient, ProviderClientError, RawProviderResponse, ReferenceClient};

use crate::db_types::Provider;

//--------------------------------------  CanonicalOutcome    --------------------------------------------------------
/// Provider-agnostic classification of a provider response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanonicalOutcome {
    /// The operation succeeded on the provider side.
    Ok,
    /// The provider has accepted the operation but not settled it yet.
    Pending,
    /// The operation was cancelled on the provider side.
    Cancelled,
    /// Idempotent retry of an action the provider has already applied.
    AlreadyDone,
    /// A transient failure. The caller may retry without corrupting state.
    RetryableFailure,
    /// A permanent failure.
    FatalFailure,
}

impl Display for CanonicalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonicalOutcome::Ok => write!(f, "OK"),
            CanonicalOutcome::Pending => write!(f, "PENDING"),
            CanonicalOutcome::Cancelled => write!(f, "CANCELLED"),
            CanonicalOutcome::AlreadyDone => write!(f, "ALREADY_DONE"),
            CanonicalOutcome::RetryableFailure => write!(f, "RETRYABLE_FAILURE"),
            CanonicalOutcome::FatalFailure => write!(f, "FATAL_FAILURE"),
        }
    }
}

//--------------------------------------   ProviderOutcome    --------------------------------------------------------
/// The result of normalizing one raw provider response. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    /// The raw provider code the outcome was derived from.
    pub code: String,
    pub status: CanonicalOutcome,
}

impl ProviderOutcome {
    pub fn new(code: &str, status: CanonicalOutcome) -> Self {
        Self { code: code.to_string(), status }
    }
}

//--------------------------------------    ProviderError     --------------------------------------------------------
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} returned unrecognised response code '{code}': {message}")]
    UnrecognizedCode { provider: Provider, code: String, message: String },
}

impl ProviderError {
    pub fn unrecognized(provider: Provider, code: &str, message: Option<&str>) -> Self {
        Self::UnrecognizedCode {
            provider,
            code: code.to_string(),
            message: message.unwrap_or("no message").to_string(),
        }
    }
}

/// Translates a raw provider response code into the canonical vocabulary for the given provider.
///
/// The `Reference` provider accepts canonical codes verbatim, which is what the stand-in client emits.
pub fn normalize(
    provider: Provider,
    code: &str,
    message: Option<&str>,
) -> Result<ProviderOutcome, ProviderError> {
    let status = match provider {
        Provider::Bango => bango::outcome_for(code),
        Provider::Braintree => braintree::outcome_for(code),
        Provider::Paypal | Provider::Reference => reference_outcome_for(code),
    };
    match status {
        Some(status) => Ok(ProviderOutcome::new(code, status)),
        None => Err(ProviderError::unrecognized(provider, code, message)),
    }
}

// The reference table doubles for Paypal, which only ever reaches us through the stand-in client.
fn reference_outcome_for(code: &str) -> Option<CanonicalOutcome> {
    match code {
        "OK" => Some(CanonicalOutcome::Ok),
        "PENDING" => Some(CanonicalOutcome::Pending),
        "CANCELLED" => Some(CanonicalOutcome::Cancelled),
        "ALREADY_DONE" => Some(CanonicalOutcome::AlreadyDone),
        "RETRYABLE_FAILURE" => Some(CanonicalOutcome::RetryableFailure),
        "FATAL_FAILURE" => Some(CanonicalOutcome::FatalFailure),
        _ => None,
    }
}
