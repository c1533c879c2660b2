//! The payment engine public API.
//!
//! [`TransactionFlowApi`] carries the reconciliation core: payments, notifications, refunds and status checks.
//! [`ClosureApi`] runs the account-closure cascade. Both are generic over the [`crate::traits::TransactionStore`]
//! backend and the [`crate::providers::ProviderClient`] seam, so the HTTP layer and the tests wire in whatever
//! implementations they need.
mod closure_api;
mod errors;
mod transaction_flow_api;

pub use closure_api::{ClosureApi, ClosureFailure, ClosureReport, ClosureTarget};
pub use errors::PaymentFlowError;
pub use transaction_flow_api::{
    ApplyContext, FlowConfig, NotificationEvent, TransactionFlowApi, DEFAULT_TRANSACTION_EXPIRY_SECS,
};
