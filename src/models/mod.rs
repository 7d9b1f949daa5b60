//! Data models for Microbank entities.
//!
//! This module contains the data structures shared between the API client
//! and the synchronization layer:
//!
//! - `Identity`, `AuthResponse`, `Profile`: the authenticated principal
//! - `ClientRecord`: roster entries visible to privileged identities
//! - `Transaction`, `TransactionKind`, `AccountSnapshot`: ledger data

pub mod banking;
pub mod identity;

pub use banking::{
    parse_positive_amount, AccountSnapshot, BalanceResponse, Transaction, TransactionKind,
};
pub use identity::{AuthResponse, ClientRecord, Identity, Profile, ADMIN_ROLE};
