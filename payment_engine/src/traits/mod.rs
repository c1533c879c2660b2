//! # Persistence contracts.
//!
//! This module defines the interface contract that payment engine database *backends* implement.
//!
//! [`TransactionStore`] is the only trait: it records transactions, serves correlation-id lookups, and provides the
//! compare-and-swap primitive the state machine commits through. The SQLite backend in [`crate::sqlite`] is the
//! reference implementation; alternative backends only need this trait.
mod transaction_store;

pub use transaction_store::{TransactionStore, TransactionStoreError};
