//! REST API client module for the Microbank backend services.
//!
//! This module provides the `ApiClient` for communicating with the
//! client/identity service (authentication, profile, roster) and the
//! banking/ledger service (balance, transactions, deposits, withdrawals).
//!
//! Both services use JWT bearer token authorization; any protected
//! endpoint may answer 401 to signal that the credential is no longer
//! valid.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
