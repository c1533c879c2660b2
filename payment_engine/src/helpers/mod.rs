mod notification_signature;

pub use notification_signature::NotificationSigner;

use rand::{distributions::Alphanumeric, Rng};

/// Generates a fresh correlation id for a refund created against the given payment uuid. The random suffix keeps
/// retried refund attempts distinguishable in the ledger.
pub fn new_refund_uuid(payment_uuid: &str) -> String {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    format!("refund:{payment_uuid}:{suffix}")
}
