//! Bango response-code table.
//!
//! Bango reports results through a `responseCode` string, both in synchronous API replies and in the
//! `bango_response_code` field of asynchronous notifications. The table below covers every code the integration is
//! known to emit; anything else is treated as protocol drift and surfaced to the caller.

use super::CanonicalOutcome;

pub(super) fn outcome_for(code: &str) -> Option<CanonicalOutcome> {
    let outcome = match code {
        "OK" => CanonicalOutcome::Ok,
        "PENDING" => CanonicalOutcome::Pending,
        "CANCEL" => CanonicalOutcome::Cancelled,
        // Bango reports idempotent replays with operation-specific codes.
        "ALREADY_REFUNDED" | "BANGO_ALREADY_PREMIUM_ENABLED" => CanonicalOutcome::AlreadyDone,
        "SERVICE_UNAVAILABLE" => CanonicalOutcome::RetryableFailure,
        "ACCESS_DENIED" | "INTERNAL_ERROR" | "CANT_REFUND" | "NOT_SUPPORTED" | "INVALID_CONFIGURATION_ID" => {
            CanonicalOutcome::FatalFailure
        },
        _ => return None,
    };
    Some(outcome)
}
