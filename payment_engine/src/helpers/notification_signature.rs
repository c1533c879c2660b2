//! # Notification signature scheme
//!
//! Providers echo a `moz_signature` field on every asynchronous notification, computed by us at payment setup time
//! and carried opaquely through the provider. The signature is an HMAC-SHA256 over the UTF-8 encoding of the
//! caller-supplied correlation id, keyed by a process-wide secret, and hex-encoded.
//!
//! A notification whose signature does not verify is rejected before any transaction state is touched. Verification
//! never panics and never errors: malformed hex, truncated input or a wrong-length digest all simply verify as
//! `false`. The underlying comparison is constant-time, so the verifier does not leak how much of a forged
//! signature matched.

use hmac::{Hmac, Mac};
use ppg_common::Secret;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies notification correlation ids with a shared secret.
///
/// The signing key is injected at construction time; there is no global signing state.
#[derive(Clone)]
pub struct NotificationSigner {
    key: Secret<String>,
}

impl NotificationSigner {
    pub fn new(key: Secret<String>) -> Self {
        Self { key }
    }

    /// Hex-encoded HMAC-SHA256 of the payload.
    pub fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.key.reveal().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time verification. Returns `false` for malformed signatures rather than erroring.
    pub fn verify(&self, payload: &str, signature: &str) -> bool {
        let Ok(sig_bytes) = hex::decode(signature) else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(self.key.reveal().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&sig_bytes).is_ok()
    }
}
