//! Aggregated data fetcher.
//!
//! One `refresh` cycle issues the profile, balance, and transaction reads
//! concurrently - plus the client roster when the identity is privileged -
//! joins them all, and applies the merged result in a single state
//! transition.

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::SessionHandle;
use crate::models::{AccountSnapshot, ClientRecord, Profile, Transaction};

use super::outcome::ReadOutcome;
use super::{
    StatusCell, MSG_BALANCE_FAILED, MSG_PROFILE_FAILED, MSG_ROSTER_FAILED, MSG_SESSION_EXPIRED,
    MSG_TRANSACTIONS_FAILED,
};

/// All four read outcomes of one refresh cycle, captured before any state
/// transition. `roster` is `None` when the read was never issued (the call
/// is gated by role, not by response).
struct CycleOutcome {
    profile: ReadOutcome<Profile>,
    balance: ReadOutcome<Decimal>,
    transactions: ReadOutcome<Vec<Transaction>>,
    roster: Option<ReadOutcome<Vec<ClientRecord>>>,
}

enum CycleResult {
    /// At least one read saw 401: log out once, discard the whole cycle.
    Unauthorized,
    /// Apply the merged snapshot; `error` is the last non-auth failure in
    /// the fixed read order, if any.
    Applied {
        snapshot: AccountSnapshot,
        error: Option<String>,
    },
}

/// Merge one cycle's outcomes over the previous snapshot.
///
/// Successful slices overwrite their fields; failed slices leave the
/// previous values in place (partial-success semantics). The fixed order
/// {profile, balance, transactions, roster} makes "last error wins"
/// deterministic.
fn merge_cycle(mut snapshot: AccountSnapshot, cycle: CycleOutcome) -> CycleResult {
    let roster_unauthorized = cycle
        .roster
        .as_ref()
        .is_some_and(|outcome| outcome.is_unauthorized());
    if cycle.profile.is_unauthorized()
        || cycle.balance.is_unauthorized()
        || cycle.transactions.is_unauthorized()
        || roster_unauthorized
    {
        return CycleResult::Unauthorized;
    }

    let mut error = None;

    // Profile participates in the failure accounting but feeds no slice.
    if let ReadOutcome::Failed(message) = cycle.profile {
        error = Some(message);
    }
    match cycle.balance {
        ReadOutcome::Success(balance) => snapshot.balance = balance,
        ReadOutcome::Failed(message) => error = Some(message),
        ReadOutcome::Unauthorized => {}
    }
    match cycle.transactions {
        ReadOutcome::Success(transactions) => snapshot.transactions = transactions,
        ReadOutcome::Failed(message) => error = Some(message),
        ReadOutcome::Unauthorized => {}
    }
    if let Some(roster) = cycle.roster {
        match roster {
            ReadOutcome::Success(clients) => snapshot.client_roster = clients,
            ReadOutcome::Failed(message) => error = Some(message),
            ReadOutcome::Unauthorized => {}
        }
    }

    CycleResult::Applied { snapshot, error }
}

/// Builds and owns the account snapshot.
///
/// The session handle and status cell arrive by constructor injection; the
/// fetcher reads the credential fresh at the start of every cycle, so a
/// logout that lands mid-flight makes the stale cycle's write unusable.
pub struct Fetcher {
    session: SessionHandle,
    api: ApiClient,
    status: StatusCell,
    snapshot: AccountSnapshot,
}

impl Fetcher {
    pub fn new(session: SessionHandle, api: ApiClient, status: StatusCell) -> Self {
        Self {
            session,
            api,
            status,
            snapshot: AccountSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &AccountSnapshot {
        &self.snapshot
    }

    /// Rebuild the snapshot from the backend.
    ///
    /// A no-op without a credential: the existing snapshot and error are
    /// left untouched. All reads are joined - the cycle only settles once
    /// every issued read has settled.
    pub async fn refresh(&mut self) {
        let Some(token) = self.session.token() else {
            debug!("No credential present, skipping refresh");
            return;
        };
        let privileged = self.session.is_admin();

        self.status.begin();
        debug!(privileged, "Refresh cycle started");

        let api = self.api.with_token(token);
        let (profile, balance, transactions, roster) = tokio::join!(
            async { ReadOutcome::capture(api.fetch_profile().await, MSG_PROFILE_FAILED) },
            async { ReadOutcome::capture(api.fetch_balance().await, MSG_BALANCE_FAILED) },
            async {
                ReadOutcome::capture(api.fetch_transactions().await, MSG_TRANSACTIONS_FAILED)
            },
            async {
                if privileged {
                    Some(ReadOutcome::capture(
                        api.fetch_clients().await,
                        MSG_ROSTER_FAILED,
                    ))
                } else {
                    None
                }
            },
        );

        let cycle = CycleOutcome {
            profile,
            balance,
            transactions,
            roster,
        };
        match merge_cycle(self.snapshot.clone(), cycle) {
            CycleResult::Unauthorized => {
                warn!("Refresh saw 401, logging out and discarding cycle");
                self.session.logout();
                self.status.finish(Some(MSG_SESSION_EXPIRED.to_string()));
            }
            CycleResult::Applied { snapshot, error } => {
                if let Some(ref message) = error {
                    warn!(error = %message, "Refresh completed with partial failure");
                } else {
                    info!(
                        transactions = snapshot.transactions.len(),
                        roster = snapshot.client_roster.len(),
                        "Refresh complete"
                    );
                }
                self.snapshot = snapshot;
                self.status.finish(error);
            }
        }
    }
}
