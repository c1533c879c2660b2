//! # Provider Payment Engine
//!
//! The payment engine is the reconciliation core of the payment gateway: it keeps a durable ledger of payment and
//! refund transactions, and drives their lifecycle as external providers asynchronously confirm, fail or cancel
//! them. This library contains the core logic and is HTTP-framework agnostic.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types used in the
//!    database, defined in the [`db_types`] module.
//! 2. Provider normalization ([`mod@providers`]). One translation table per external processor maps raw response
//!    codes onto the canonical outcome vocabulary the state machine understands, plus the [`providers::ProviderClient`]
//!    seam behind which the actual SDKs live.
//! 3. The engine public API ([`mod@api`]). [`TransactionFlowApi`] records payments, reconciles notifications,
//!    orchestrates refunds and serves status checks; [`ClosureApi`] runs the account closure cascade. Backends
//!    implement the trait in [`mod@traits`] to plug in.
pub mod api;
pub mod db_types;
pub mod helpers;
pub mod providers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db_url, SqliteDatabase};

pub use api::{
    ClosureApi, ClosureReport, FlowConfig, NotificationEvent, PaymentFlowError, TransactionFlowApi,
};
pub use traits::{TransactionStore, TransactionStoreError};
