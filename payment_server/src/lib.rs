//! # Provider Payment Gateway server
//! This crate hosts the HTTP boundary of the payment gateway. It is responsible for:
//! Accepting transaction and refund requests from the frontend.
//! Listening for asynchronous settlement notifications from the payment providers.
//! Serving status-check polls and the account closure cascade.
//!
//! ## Configuration
//! The server is configured via `PPG_*` environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/transaction`, `/transaction/{uuid}`: Create and fetch ledger records.
//! * `/notification`: The Bango settlement callback.
//! * `/refund`, `/refund/status/{uuid}`: Refund orchestration.
//! * `/status/{uuid}`: Payment status checks.
//! * `/closure`: The account closure cascade.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
