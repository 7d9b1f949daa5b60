//! Session-aware data synchronization.
//!
//! This module is the core of the crate:
//! - `Fetcher`: issues the concurrent aggregated reads and reconciles them
//!   into one `AccountSnapshot`
//! - `Executor`: the single funnel for authenticated mutating commands
//! - `ReadOutcome`: each read settles into a tagged outcome before any
//!   session-state transition is applied, keeping the "one 401 aborts the
//!   whole cycle" rule race-free
//!
//! Every failure is absorbed here and surfaced only through
//! `FetchStatus.error`; nothing propagates to the consumer as a fault.

pub mod executor;
pub mod fetcher;
pub mod outcome;

pub use executor::{CommandOutcome, CommandRequest, Executor};
pub use fetcher::Fetcher;
pub use outcome::ReadOutcome;

use std::sync::{Arc, Mutex, MutexGuard};

// User-facing error strings. The view layer displays these verbatim and
// auto-dismisses them; they never carry backend internals.
pub const MSG_SESSION_EXPIRED: &str = "Session expired or unauthorized. Please log in again.";
pub const MSG_NOT_AUTHENTICATED: &str = "User is not authenticated.";
pub const MSG_NETWORK_ERROR: &str =
    "A network error occurred. Please ensure both services are running.";
pub const MSG_INVALID_AMOUNT: &str = "Please enter a valid amount.";

pub const MSG_PROFILE_FAILED: &str = "Failed to fetch user profile.";
pub const MSG_BALANCE_FAILED: &str = "Failed to fetch account balance.";
pub const MSG_TRANSACTIONS_FAILED: &str = "Failed to fetch transactions.";
pub const MSG_ROSTER_FAILED: &str = "Failed to fetch client list.";

pub const MSG_DEPOSIT_FAILED: &str = "Deposit failed.";
pub const MSG_WITHDRAW_FAILED: &str = "Withdrawal failed.";
pub const MSG_BLACKLIST_FAILED: &str = "Failed to toggle blacklist status.";

/// Outcome of the most recent fetch or command attempt.
/// Cleared at the start of each new attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Shared `FetchStatus` cell. The fetcher and executor both write it; the
/// view layer reads it through `BankClient::status`.
#[derive(Clone, Default)]
pub struct StatusCell(Arc<Mutex<FetchStatus>>);

impl StatusCell {
    pub fn get(&self) -> FetchStatus {
        self.lock().clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub(crate) fn begin(&self) {
        let mut status = self.lock();
        status.is_loading = true;
        status.error = None;
    }

    pub(crate) fn finish(&self, error: Option<String>) {
        let mut status = self.lock();
        status.is_loading = false;
        if error.is_some() {
            status.error = error;
        }
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.lock().error = Some(message.into());
    }

    /// Set an error only when none is recorded yet; keeps a specific
    /// message (session expired, network) from being blurred by a generic
    /// per-operation default.
    pub(crate) fn set_error_if_empty(&self, message: &str) {
        let mut status = self.lock();
        if status.error.is_none() {
            status.error = Some(message.to_string());
        }
    }

    pub(crate) fn clear_error(&self) {
        self.lock().error = None;
    }

    fn lock(&self) -> MutexGuard<'_, FetchStatus> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
