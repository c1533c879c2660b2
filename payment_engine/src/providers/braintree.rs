//! Braintree response-code table.
//!
//! Braintree reports transaction state through lowercase status words on its result objects rather than a single
//! response-code field. Declined and gateway-rejected results carry the same shape, so both land in the fatal bucket.

use super::CanonicalOutcome;

pub(super) fn outcome_for(code: &str) -> Option<CanonicalOutcome> {
    let outcome = match code {
        "settled" | "settling" | "submitted_for_settlement" => CanonicalOutcome::Ok,
        "authorized" | "settlement_pending" => CanonicalOutcome::Pending,
        "voided" => CanonicalOutcome::Cancelled,
        "already_refunded" => CanonicalOutcome::AlreadyDone,
        "settlement_declined" | "processor_declined" | "gateway_rejected" | "authorization_expired" | "failed" => {
            CanonicalOutcome::FatalFailure
        },
        "down_for_maintenance" => CanonicalOutcome::RetryableFailure,
        _ => return None,
    };
    Some(outcome)
}
