//! Microbank client - session and data-synchronization layer.
//!
//! This crate owns the authentication token for a two-service banking
//! backend (identity service + banking service), fans out concurrent reads
//! across both, reconciles the responses into one `AccountSnapshot`, and
//! funnels every authenticated write through a single executor with uniform
//! 401 handling. A view layer consumes `BankClient` and only ever observes
//! `{is_loading, error, snapshot}` - no failure is thrown across this
//! boundary.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod models;
pub mod sync;

pub use client::BankClient;
pub use config::Config;
pub use models::{AccountSnapshot, ClientRecord, Identity, Transaction, TransactionKind};
pub use sync::{CommandOutcome, CommandRequest, FetchStatus};
